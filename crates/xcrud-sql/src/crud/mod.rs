//! CRUD statement builders
//!
//! One [`StatementBuilder`] per CRUD message kind. Only INSERT has a SQL
//! rendering so far; the other kinds resolve to a builder that reports
//! [`Error::Unsupported`] instead of falling through to a generic error.

mod insert;

pub use insert::InsertBuilder;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::expressions::{Collection, Insert};
use crate::generator::GeneratorConfig;

/// CRUD message kinds, with their X protocol client message ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrudKind {
    Find,
    Insert,
    Update,
    Delete,
    CreateView,
    ModifyView,
    DropView,
}

impl CrudKind {
    pub const ALL: [CrudKind; 7] = [
        CrudKind::Find,
        CrudKind::Insert,
        CrudKind::Update,
        CrudKind::Delete,
        CrudKind::CreateView,
        CrudKind::ModifyView,
        CrudKind::DropView,
    ];

    /// Resolve a `Mysqlx.ClientMessages.Type` id.
    pub fn from_message_type(message_type: u32) -> Result<Self> {
        match message_type {
            17 => Ok(CrudKind::Find),
            18 => Ok(CrudKind::Insert),
            19 => Ok(CrudKind::Update),
            20 => Ok(CrudKind::Delete),
            30 => Ok(CrudKind::CreateView),
            31 => Ok(CrudKind::ModifyView),
            32 => Ok(CrudKind::DropView),
            other => Err(Error::bad_message(format!(
                "Unknown crud message type {other}"
            ))),
        }
    }

    pub fn message_type(self) -> u32 {
        match self {
            CrudKind::Find => 17,
            CrudKind::Insert => 18,
            CrudKind::Update => 19,
            CrudKind::Delete => 20,
            CrudKind::CreateView => 30,
            CrudKind::ModifyView => 31,
            CrudKind::DropView => 32,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CrudKind::Find => "CRUD_FIND",
            CrudKind::Insert => "CRUD_INSERT",
            CrudKind::Update => "CRUD_UPDATE",
            CrudKind::Delete => "CRUD_DELETE",
            CrudKind::CreateView => "CRUD_CREATE_VIEW",
            CrudKind::ModifyView => "CRUD_MODIFY_VIEW",
            CrudKind::DropView => "CRUD_DROP_VIEW",
        }
    }
}

impl fmt::Display for CrudKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded CRUD message.
///
/// Kinds without a builder only carry their target collection; their
/// remaining fields are not decoded yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrudMessage {
    Find(Collection),
    Insert(Insert),
    Update(Collection),
    Delete(Collection),
    CreateView(Collection),
    ModifyView(Collection),
    DropView(Collection),
}

impl CrudMessage {
    pub fn kind(&self) -> CrudKind {
        match self {
            CrudMessage::Find(_) => CrudKind::Find,
            CrudMessage::Insert(_) => CrudKind::Insert,
            CrudMessage::Update(_) => CrudKind::Update,
            CrudMessage::Delete(_) => CrudKind::Delete,
            CrudMessage::CreateView(_) => CrudKind::CreateView,
            CrudMessage::ModifyView(_) => CrudKind::ModifyView,
            CrudMessage::DropView(_) => CrudKind::DropView,
        }
    }

    pub fn collection(&self) -> &Collection {
        match self {
            CrudMessage::Insert(insert) => &insert.collection,
            CrudMessage::Find(c)
            | CrudMessage::Update(c)
            | CrudMessage::Delete(c)
            | CrudMessage::CreateView(c)
            | CrudMessage::ModifyView(c)
            | CrudMessage::DropView(c) => c,
        }
    }
}

/// Turns one kind of CRUD message into a SQL statement.
pub trait StatementBuilder: Send + Sync {
    /// The message kind this builder handles.
    fn kind(&self) -> CrudKind;

    /// Build the statement for `message`.
    ///
    /// Returns the complete statement or the first error; never partial SQL.
    fn build(&self, message: &CrudMessage, config: &GeneratorConfig) -> Result<String>;
}

/// Builder for kinds that have no SQL rendering yet.
#[derive(Debug, Clone, Copy)]
pub struct UnsupportedBuilder(CrudKind);

impl StatementBuilder for UnsupportedBuilder {
    fn kind(&self) -> CrudKind {
        self.0
    }

    fn build(&self, message: &CrudMessage, _config: &GeneratorConfig) -> Result<String> {
        if message.kind() != self.0 {
            return Err(mismatched_message(self.0, message));
        }
        Err(Error::unsupported(format!("{} statement", self.0)))
    }
}

static INSERT: InsertBuilder = InsertBuilder;
static FIND: UnsupportedBuilder = UnsupportedBuilder(CrudKind::Find);
static UPDATE: UnsupportedBuilder = UnsupportedBuilder(CrudKind::Update);
static DELETE: UnsupportedBuilder = UnsupportedBuilder(CrudKind::Delete);
static CREATE_VIEW: UnsupportedBuilder = UnsupportedBuilder(CrudKind::CreateView);
static MODIFY_VIEW: UnsupportedBuilder = UnsupportedBuilder(CrudKind::ModifyView);
static DROP_VIEW: UnsupportedBuilder = UnsupportedBuilder(CrudKind::DropView);

/// The builder for `kind`.
pub fn builder_for(kind: CrudKind) -> &'static dyn StatementBuilder {
    match kind {
        CrudKind::Insert => &INSERT,
        CrudKind::Find => &FIND,
        CrudKind::Update => &UPDATE,
        CrudKind::Delete => &DELETE,
        CrudKind::CreateView => &CREATE_VIEW,
        CrudKind::ModifyView => &MODIFY_VIEW,
        CrudKind::DropView => &DROP_VIEW,
    }
}

/// Build the statement for `message` with the matching builder.
pub fn build_statement(message: &CrudMessage, config: &GeneratorConfig) -> Result<String> {
    builder_for(message.kind()).build(message, config)
}

fn mismatched_message(expected: CrudKind, message: &CrudMessage) -> Error {
    Error::bad_message(format!(
        "{} builder cannot handle {} message",
        expected,
        message.kind()
    ))
}
