//! Dispatcher Tests
//!
//! Message routing, execution hand-off, and acknowledgement.

use xcrud_sql::crud::{CrudKind, CrudMessage};
use xcrud_sql::dispatcher::OK_NOTICE;
use xcrud_sql::expressions::{Collection, Expression, Insert};
use xcrud_sql::{CrudDispatcher, Error, NoticeSender, Result, SqlExecutor};

#[derive(Default)]
struct Engine {
    executed: Vec<String>,
}

impl SqlExecutor for Engine {
    type Output = ();

    fn execute(&mut self, sql: &str) -> Result<()> {
        self.executed.push(sql.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct Channel {
    sent: Vec<String>,
    closed: bool,
}

impl NoticeSender for Channel {
    fn send_ok(&mut self, message: &str) -> Result<()> {
        if self.closed {
            return Err(Error::notice("connection closed"));
        }
        self.sent.push(message.to_string());
        Ok(())
    }
}

fn insert() -> CrudMessage {
    CrudMessage::Insert(
        Insert::table(Collection::new("test", "t"), ["a"]).row([Expression::uint(7)]),
    )
}

#[test]
fn test_insert_by_message_type() {
    let mut engine = Engine::default();
    let mut channel = Channel::default();
    let mut dispatcher = CrudDispatcher::new(&mut engine, &mut channel);

    dispatcher
        .dispatch_message_type(CrudKind::Insert.message_type(), &insert())
        .unwrap();
    drop(dispatcher);

    assert_eq!(engine.executed, vec!["INSERT INTO `test`.`t` (`a`) VALUES (7)"]);
    assert_eq!(channel.sent, vec![OK_NOTICE]);
}

#[test]
fn test_unknown_message_type() {
    let mut dispatcher = CrudDispatcher::new(Engine::default(), Channel::default());
    let err = dispatcher.dispatch_message_type(99, &insert()).unwrap_err();
    assert!(matches!(err, Error::BadMessage(_)));

    let (engine, channel) = dispatcher.into_parts();
    assert!(engine.executed.is_empty());
    assert!(channel.sent.is_empty());
}

#[test]
fn test_unsupported_kind_is_not_executed() {
    let mut dispatcher = CrudDispatcher::new(Engine::default(), Channel::default());
    let err = dispatcher
        .dispatch(&CrudMessage::Update(Collection::new("test", "t")))
        .unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)));
    assert!(dispatcher.into_parts().0.executed.is_empty());
}

#[test]
fn test_build_error_is_not_executed() {
    let mut dispatcher = CrudDispatcher::new(Engine::default(), Channel::default());
    let bad = CrudMessage::Insert(Insert::table(Collection::new("test", "t"), ["a", "b"]).row([
        Expression::uint(1),
    ]));
    assert!(matches!(dispatcher.dispatch(&bad), Err(Error::BadInsertData(_))));
    assert!(dispatcher.into_parts().0.executed.is_empty());
}

#[test]
fn test_notice_failure_is_reported() {
    let channel = Channel {
        closed: true,
        ..Default::default()
    };
    let mut dispatcher = CrudDispatcher::new(Engine::default(), channel);
    let err = dispatcher.dispatch(&insert()).unwrap_err();
    assert!(matches!(err, Error::Notice(_)));
    assert!(!err.is_compile_error());
    assert_eq!(dispatcher.into_parts().0.executed.len(), 1);
}
