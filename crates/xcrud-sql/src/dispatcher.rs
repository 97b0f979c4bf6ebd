//! CRUD message dispatch.
//!
//! [`CrudDispatcher`] picks the statement builder for a message, hands the
//! generated SQL to the execution engine, and acknowledges success on the
//! notice channel. It is the only place that emits diagnostics; builders and
//! the generator stay silent and only return errors.

use crate::crud::{builder_for, CrudKind, CrudMessage};
use crate::error::Result;
use crate::generator::GeneratorConfig;

/// Payload of the acknowledgement sent after a statement succeeds.
pub const OK_NOTICE: &str = "ok";

/// Runs generated SQL.
pub trait SqlExecutor {
    type Output;

    /// Execute one statement. Failures are reported as
    /// [`Error::Execution`](crate::error::Error::Execution).
    fn execute(&mut self, sql: &str) -> Result<Self::Output>;
}

/// Delivers acknowledgements to the client.
pub trait NoticeSender {
    fn send_ok(&mut self, message: &str) -> Result<()>;
}

impl<T: SqlExecutor + ?Sized> SqlExecutor for &mut T {
    type Output = T::Output;

    fn execute(&mut self, sql: &str) -> Result<Self::Output> {
        (**self).execute(sql)
    }
}

impl<T: NoticeSender + ?Sized> NoticeSender for &mut T {
    fn send_ok(&mut self, message: &str) -> Result<()> {
        (**self).send_ok(message)
    }
}

/// Routes CRUD messages of one connection.
#[derive(Debug)]
pub struct CrudDispatcher<E, N> {
    executor: E,
    notices: N,
    config: GeneratorConfig,
}

impl<E: SqlExecutor, N: NoticeSender> CrudDispatcher<E, N> {
    pub fn new(executor: E, notices: N) -> Self {
        Self::with_config(executor, notices, GeneratorConfig::default())
    }

    pub fn with_config(executor: E, notices: N, config: GeneratorConfig) -> Self {
        Self {
            executor,
            notices,
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the SQL for `message` without executing it.
    pub fn build(&self, message: &CrudMessage) -> Result<String> {
        let kind = message.kind();
        builder_for(kind)
            .build(message, &self.config)
            .inspect_err(|err| {
                tracing::warn!(
                    kind = %kind,
                    collection = %message.collection(),
                    code = err.code(),
                    error = %err,
                    "failed to build crud statement"
                );
            })
    }

    /// Build, execute, and acknowledge `message`.
    pub fn dispatch(&mut self, message: &CrudMessage) -> Result<E::Output> {
        let kind = message.kind();
        let sql = self.build(message)?;
        tracing::debug!(kind = %kind, sql = %sql, "crud query");

        let output = self.executor.execute(&sql).inspect_err(|err| {
            tracing::debug!(kind = %kind, error = %err, "crud query failed");
        })?;
        self.notices.send_ok(OK_NOTICE)?;
        Ok(output)
    }

    /// Dispatch a message whose type arrived as a raw client message id.
    ///
    /// The id must agree with the decoded payload.
    pub fn dispatch_message_type(
        &mut self,
        message_type: u32,
        message: &CrudMessage,
    ) -> Result<E::Output> {
        let kind = CrudKind::from_message_type(message_type).inspect_err(|err| {
            tracing::warn!(message_type, error = %err, "unknown crud message type");
        })?;
        if kind != message.kind() {
            return Err(crate::error::Error::bad_message(format!(
                "Message type {} does not match {} payload",
                kind,
                message.kind()
            )));
        }
        self.dispatch(message)
    }

    pub fn into_parts(self) -> (E, N) {
        (self.executor, self.notices)
    }
}
