// Command shell: owns the session and runs one record workflow per command.

use std::fmt;
use std::str::FromStr;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{AuthReply, Transport};
use crate::error::{ClientError, Result};
use crate::model::{Credentials, Record, Session};
use crate::ui::InputCollector;

pub const COMMAND_HELP: &str = "Commands:\n\
    register  register a new user\n\
    login     authenticate an existing user\n\
    add       store new data\n\
    get       list your stored data\n\
    edit      change a record by id\n\
    delete    delete a record by id\n\
    ping      check that the server is reachable\n\
    info      show the client version and this list\n\
    exit      quit";

const DATA_TYPE: &str = "data-type";
const DATA_ID: &str = "data-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Register,
    Login,
    Add,
    Get,
    Edit,
    Delete,
    Ping,
    Help,
    Info,
    Exit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "register" => Command::Register,
            "login" => Command::Login,
            "add" => Command::Add,
            "get" => Command::Get,
            "edit" => Command::Edit,
            "delete" => Command::Delete,
            "ping" => Command::Ping,
            "help" => Command::Help,
            "info" => Command::Info,
            "exit" => Command::Exit,
            other => return Err(format!("unknown command `{other}`")),
        })
    }
}

/// How [`Shell::run`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// The user typed `exit`.
    Exit,
    /// The cancellation token fired.
    Cancelled,
    /// The command source reached end of input.
    InputClosed,
}

impl fmt::Display for Shutdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Shutdown::Exit => "exit requested",
            Shutdown::Cancelled => "interrupted",
            Shutdown::InputClosed => "input closed",
        })
    }
}

/// Session and record workflow engine.
///
/// Every operation is synchronous and runs to completion before the next
/// command is read. The session token has one writer (`register`/`login`)
/// and is lent to the transport on every data call.
pub struct Shell<T, C> {
    transport: T,
    input: C,
    session: Session,
}

impl<T: Transport, C: InputCollector> Shell<T, C> {
    pub fn new(transport: T, input: C) -> Self {
        Shell {
            transport,
            input,
            session: Session::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    #[cfg(test)]
    fn transport(&self) -> &T {
        &self.transport
    }

    /// Read and execute commands until `exit`, cancellation or the end of
    /// the command source.
    ///
    /// Workflow failures are printed and the loop continues. An interrupted
    /// or closed command source ends the loop normally; any other read error
    /// on it is returned.
    pub fn run(&mut self, cancel: &CancellationToken) -> Result<Shutdown> {
        loop {
            if cancel.is_cancelled() {
                return Ok(self.stop(Shutdown::Cancelled));
            }

            let token = match self.input.command() {
                Ok(Some(token)) => token,
                Ok(None) => return Ok(self.stop(Shutdown::InputClosed)),
                // Ctrl+C on a terminal prompt surfaces as an interrupted read,
                // sometimes before the signal listener has cancelled the token.
                Err(e) if cancel.is_cancelled() || e.is_interrupted() => {
                    debug!(error = %e, "command read interrupted");
                    return Ok(self.stop(Shutdown::Cancelled));
                }
                Err(e) if e.is_input_closed() => return Ok(self.stop(Shutdown::InputClosed)),
                Err(e) => return Err(e),
            };

            // A signal may have arrived while we were blocked on the read.
            if cancel.is_cancelled() {
                return Ok(self.stop(Shutdown::Cancelled));
            }

            let command = match token.parse::<Command>() {
                Ok(Command::Exit) => return Ok(self.stop(Shutdown::Exit)),
                Ok(command) => command,
                Err(e) => {
                    println!("{e}\n{COMMAND_HELP}");
                    continue;
                }
            };

            if let Err(e) = self.execute(command) {
                warn!(?command, error = %e, "command failed");
                println!("Error: {e}");
                if e.is_input_closed() {
                    return Ok(self.stop(Shutdown::InputClosed));
                }
            }
        }
    }

    fn stop(&self, reason: Shutdown) -> Shutdown {
        info!(%reason, "command loop finished");
        match reason {
            Shutdown::Cancelled => println!("Interrupted, shutting down."),
            _ => println!("Goodbye."),
        }
        reason
    }

    /// Dispatch a single command.
    pub fn execute(&mut self, command: Command) -> Result<()> {
        debug!(?command, authenticated = self.session.is_authenticated(), "executing");
        match command {
            Command::Register => self.register(),
            Command::Login => self.authenticate(),
            Command::Add => self.add_data(),
            Command::Get => self.get_data().map(|_| ()),
            Command::Edit => self.edit_data(),
            Command::Delete => self.delete_data(),
            Command::Ping => self.ping(),
            Command::Help => {
                println!("{COMMAND_HELP}");
                Ok(())
            }
            Command::Info => {
                println!("keeper {}\n{COMMAND_HELP}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            Command::Exit => Ok(()),
        }
    }

    pub fn register(&mut self) -> Result<()> {
        let credentials = self.credentials()?;
        let reply = self.transport.register(&credentials)?;
        self.start_session(reply);
        Ok(())
    }

    pub fn authenticate(&mut self) -> Result<()> {
        let credentials = self.credentials()?;
        let reply = self.transport.authenticate(&credentials)?;
        self.start_session(reply);
        Ok(())
    }

    fn credentials(&mut self) -> Result<Credentials> {
        let login = self.input.login()?;
        let password = self.input.password()?;
        Ok(Credentials { login, password })
    }

    fn start_session(&mut self, reply: AuthReply) {
        if self.session.is_authenticated() {
            info!("replacing existing session");
        }
        self.session.replace(reply.token);
        print_response(&reply.body);
    }

    /// Collect a new record and store it. Choosing `exit` at the kind
    /// prompt cancels without error.
    pub fn add_data(&mut self) -> Result<()> {
        let meta_info = self.input.meta_info()?;
        let Some(kind) = self.input.record_kind()? else {
            debug!("add cancelled");
            return Ok(());
        };
        let draft = self.input.draft(kind, meta_info)?;
        let body = serde_json::to_value(&draft).map_err(ClientError::Encode)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(kind.content_type()));
        insert_header(&mut headers, DATA_TYPE, kind.wire_tag())?;

        let response = self.transport.post(&self.session, "add_data", &body, headers)?;
        print_response(&response);
        Ok(())
    }

    /// Fetch, print and return every record of the current user.
    pub fn get_data(&mut self) -> Result<Vec<Record>> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let body = self.transport.get(&self.session, "get_data", headers)?;
        let records: Vec<Record> =
            serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
                path: "get_data".to_string(),
                source,
            })?;

        for record in &records {
            println!("{record}");
        }
        Ok(records)
    }

    /// Replace a record's content. The draft is built for the kind the
    /// server reports for that id; the user never picks it.
    pub fn edit_data(&mut self) -> Result<()> {
        let records = self.get_data()?;
        let id = self.input.record_id()?;

        let record = records
            .iter()
            .find(|record| record.id == id)
            .ok_or(ClientError::RecordNotFound(id))?;
        let kind = record.kind().ok_or_else(|| ClientError::UnsupportedKind {
            id,
            data_type: record.data_type.clone(),
        })?;

        let meta_info = self.input.meta_info()?;
        let draft = self.input.draft(kind, meta_info)?;
        debug!(id, %kind, has_meta = !draft.meta_info().is_empty(), "editing record");
        let body = serde_json::to_value(&draft).map_err(ClientError::Encode)?;

        let mut headers = HeaderMap::new();
        insert_header(&mut headers, DATA_ID, &id.to_string())?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        insert_header(&mut headers, DATA_TYPE, kind.wire_tag())?;

        let response = self.transport.post(&self.session, "edit_data", &body, headers)?;
        print_response(&response);
        Ok(())
    }

    pub fn delete_data(&mut self) -> Result<()> {
        let id = self.input.record_id()?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let path = format!("delete_data?id={id}");
        let response = self.transport.get(&self.session, &path, headers)?;
        print_response(&response);
        Ok(())
    }

    pub fn ping(&mut self) -> Result<()> {
        let status = self.transport.ping()?;
        println!("{status}");
        Ok(())
    }
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) -> Result<()> {
    let value = HeaderValue::from_str(value).map_err(|e| ClientError::Header {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}

fn print_response(body: &[u8]) {
    println!("Server response: {}", String::from_utf8_lossy(body));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::io::Cursor;

    use serde_json::{json, Value};

    use crate::model::RecordKind;
    use crate::ui::LineCollector;

    #[derive(Debug, Clone)]
    struct Call {
        method: &'static str,
        path: String,
        token: String,
        body: Option<Value>,
        headers: HeaderMap,
    }

    /// Records every call and answers from a queue of canned replies.
    #[derive(Default)]
    struct FakeTransport {
        calls: RefCell<Vec<Call>>,
        replies: RefCell<VecDeque<Result<Vec<u8>>>>,
        token: String,
    }

    impl FakeTransport {
        fn issuing(token: &str) -> Self {
            FakeTransport {
                token: token.to_string(),
                ..Default::default()
            }
        }

        fn reply(self, body: &str) -> Self {
            self.replies
                .borrow_mut()
                .push_back(Ok(body.as_bytes().to_vec()));
            self
        }

        fn fail(self, err: ClientError) -> Self {
            self.replies.borrow_mut().push_back(Err(err));
            self
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        fn next_reply(&self) -> Result<Vec<u8>> {
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(b"{}".to_vec()))
        }

        fn record(
            &self,
            method: &'static str,
            session: &Session,
            path: &str,
            body: Option<Value>,
            headers: HeaderMap,
        ) {
            self.calls.borrow_mut().push(Call {
                method,
                path: path.to_string(),
                token: session.token().to_string(),
                body,
                headers,
            });
        }
    }

    impl Transport for FakeTransport {
        fn register(&self, credentials: &Credentials) -> Result<AuthReply> {
            self.authenticate(credentials)
        }

        fn authenticate(&self, credentials: &Credentials) -> Result<AuthReply> {
            self.record(
                "AUTH",
                &Session::new(),
                "authentication",
                Some(json!({"login": credentials.login, "password": credentials.password})),
                HeaderMap::new(),
            );
            let body = self.next_reply()?;
            Ok(AuthReply {
                token: self.token.clone(),
                body,
            })
        }

        fn get(&self, session: &Session, path: &str, headers: HeaderMap) -> Result<Vec<u8>> {
            self.record("GET", session, path, None, headers);
            self.next_reply()
        }

        fn post(
            &self,
            session: &Session,
            path: &str,
            body: &Value,
            headers: HeaderMap,
        ) -> Result<Vec<u8>> {
            self.record("POST", session, path, Some(body.clone()), headers);
            self.next_reply()
        }

        fn ping(&self) -> Result<String> {
            Ok("200 OK".into())
        }
    }

    type TestShell = Shell<FakeTransport, LineCollector<Cursor<Vec<u8>>, Vec<u8>>>;

    fn shell(transport: FakeTransport, script: &str) -> TestShell {
        let input = LineCollector::new(Cursor::new(script.as_bytes().to_vec()), Vec::new());
        Shell::new(transport, input)
    }

    fn header<'a>(call: &'a Call, name: &str) -> &'a str {
        call.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    }

    const LISTING: &str = r#"[
        {"ID":1,"UserID":7,"UserData":"data1","DataType":"text"},
        {"ID":2,"UserID":7,"UserData":"creds","DataType":"log-pas"},
        {"ID":3,"UserID":7,"UserData":"blob","DataType":"binary"},
        {"ID":4,"UserID":7,"UserData":"????","DataType":"card"}
    ]"#;

    #[test]
    fn parses_commands() {
        assert_eq!("login".parse::<Command>(), Ok(Command::Login));
        assert_eq!("info".parse::<Command>(), Ok(Command::Info));
        assert!("LOGIN".parse::<Command>().is_err());
    }

    #[test]
    fn login_stores_token_for_later_calls() {
        let transport = FakeTransport::issuing("tok-1").reply("welcome").reply("[]");
        let mut shell = shell(transport, "alice\nsecret\n");

        shell.authenticate().unwrap();
        assert_eq!(shell.session().token(), "tok-1");

        shell.get_data().unwrap();
        let calls = shell.transport().calls();
        assert_eq!(calls[0].body, Some(json!({"login": "alice", "password": "secret"})));
        assert_eq!(calls[1].path, "get_data");
        assert_eq!(calls[1].token, "tok-1");
    }

    #[test]
    fn reauthentication_overwrites_token() {
        let mut shell = shell(FakeTransport::issuing("first"), "a\nb\n");
        shell.register().unwrap();
        assert_eq!(shell.session().token(), "first");

        shell.transport.token = "second".into();
        shell.input = LineCollector::new(Cursor::new(b"c\nd\n".to_vec()), Vec::new());
        shell.authenticate().unwrap();
        assert_eq!(shell.session().token(), "second");
    }

    #[test]
    fn failed_login_keeps_previous_session() {
        let transport =
            FakeTransport::issuing("unused").fail(ClientError::MissingCookie("user_info".into()));
        let mut shell = shell(transport, "alice\nsecret\n");
        assert!(matches!(shell.authenticate(), Err(ClientError::MissingCookie(_))));
        assert!(!shell.session().is_authenticated());
    }

    #[test]
    fn get_data_decodes_records() {
        let transport = FakeTransport::default()
            .reply(r#"[{"ID":1,"UserID":1,"UserData":"data1","DataType":"text"}]"#);
        let mut shell = shell(transport, "");

        let records = shell.get_data().unwrap();
        assert_eq!(
            records,
            vec![Record {
                id: 1,
                owner_id: 1,
                payload: "data1".into(),
                data_type: "text".into(),
            }]
        );
        let calls = shell.transport().calls();
        assert_eq!(calls[0].method, "GET");
        assert_eq!(header(&calls[0], "content-type"), "application/json");
    }

    #[test]
    fn get_data_is_repeatable() {
        let transport = FakeTransport::default().reply(LISTING).reply(LISTING);
        let mut shell = shell(transport, "");
        assert_eq!(shell.get_data().unwrap(), shell.get_data().unwrap());
    }

    #[test]
    fn get_data_reports_malformed_json() {
        let mut shell = shell(FakeTransport::default().reply("not json"), "");
        assert!(matches!(shell.get_data(), Err(ClientError::Decode { .. })));
    }

    #[test]
    fn get_data_surfaces_unauthorized() {
        let transport = FakeTransport::default().fail(ClientError::Unauthorized {
            path: "get_data".into(),
        });
        let mut shell = shell(transport, "");
        assert!(matches!(shell.get_data(), Err(ClientError::Unauthorized { .. })));
    }

    #[test]
    fn add_credential_record() {
        let transport = FakeTransport::default().reply(r#"{"status":"success"}"#);
        let mut shell = shell(transport, "yes\nwork vpn\nkey-pas\nuser\npass\n");

        shell.add_data().unwrap();

        let calls = shell.transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, "add_data");
        assert_eq!(header(&calls[0], "data-type"), "log-pas");
        assert_eq!(header(&calls[0], "content-type"), "application/json");
        assert_eq!(
            calls[0].body,
            Some(json!({"login": "user", "password": "pass", "meta-info": "work vpn"}))
        );
    }

    #[test]
    fn add_binary_record_reads_rest_of_input() {
        let mut shell = shell(FakeTransport::default(), "no\nbinary\nAB");

        shell.add_data().unwrap();

        let calls = shell.transport().calls();
        assert_eq!(header(&calls[0], "data-type"), "binary");
        assert_eq!(header(&calls[0], "content-type"), "application/octet-stream");
        assert_eq!(calls[0].body, Some(json!({"meta-info": "", "binary-data": "QUI="})));
    }

    #[test]
    fn add_exit_sends_nothing() {
        let mut shell = shell(FakeTransport::default(), "no\nexit\n");
        shell.add_data().unwrap();
        assert!(shell.transport().calls().is_empty());
    }

    #[test]
    fn add_propagates_server_error() {
        let transport = FakeTransport::default().fail(ClientError::Status {
            path: "add_data".into(),
            status: 500,
            body: "boom".into(),
        });
        let mut shell = shell(transport, "no\ntext\nhello\n");
        assert!(matches!(shell.add_data(), Err(ClientError::Status { status: 500, .. })));
    }

    #[test]
    fn add_with_closed_input_is_an_error() {
        let mut shell = shell(FakeTransport::default(), "");
        assert!(shell.add_data().unwrap_err().is_input_closed());
        assert!(shell.transport().calls().is_empty());
    }

    #[test]
    fn edit_builds_draft_for_the_stored_kind() {
        let transport = FakeTransport::default().reply(LISTING).reply("edited");
        let mut shell = shell(transport, "2\nno\nnew-login\nnew-pass\n");

        shell.edit_data().unwrap();

        let calls = shell.transport().calls();
        assert_eq!(calls.len(), 2);
        let post = &calls[1];
        assert_eq!(post.path, "edit_data");
        assert_eq!(header(post, "data-id"), "2");
        assert_eq!(header(post, "data-type"), "log-pas");
        assert_eq!(
            post.body,
            Some(json!({"login": "new-login", "password": "new-pass", "meta-info": ""}))
        );
    }

    #[test]
    fn edit_text_record_with_meta() {
        let transport = FakeTransport::default().reply(LISTING).reply("edited");
        let mut shell = shell(transport, "1\nyes\nnote\nupdated text\n");

        shell.edit_data().unwrap();

        let post = &shell.transport().calls()[1];
        assert_eq!(header(post, "data-type"), "text");
        assert_eq!(post.body, Some(json!({"text": "updated text", "meta-info": "note"})));
    }

    #[test]
    fn edit_binary_record() {
        let transport = FakeTransport::default().reply(LISTING).reply("edited");
        let mut shell = shell(transport, "3\nno\nAB");

        shell.edit_data().unwrap();

        let post = &shell.transport().calls()[1];
        assert_eq!(header(post, "data-id"), "3");
        assert_eq!(header(post, "data-type"), "binary");
        assert_eq!(header(post, "content-type"), "application/json");
        assert_eq!(post.body, Some(json!({"meta-info": "", "binary-data": "QUI="})));
    }

    #[test]
    fn edit_unknown_id_fails_without_posting() {
        let transport = FakeTransport::default().reply(LISTING);
        let mut shell = shell(transport, "99\n");

        assert!(matches!(shell.edit_data(), Err(ClientError::RecordNotFound(99))));
        let calls = shell.transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "GET");
    }

    #[test]
    fn edit_unsupported_kind_fails_without_posting() {
        let transport = FakeTransport::default().reply(LISTING);
        let mut shell = shell(transport, "4\n");

        let err = shell.edit_data().unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedKind { id: 4, ref data_type } if data_type == "card"));
        assert_eq!(shell.transport().calls().len(), 1);
    }

    #[test]
    fn edit_stops_when_listing_fails() {
        let transport = FakeTransport::default().fail(ClientError::Unauthorized {
            path: "get_data".into(),
        });
        let mut shell = shell(transport, "1\n");
        assert!(shell.edit_data().is_err());
        assert_eq!(shell.transport().calls().len(), 1);
    }

    #[test]
    fn delete_passes_id_as_query() {
        let transport = FakeTransport::default().reply("deleted");
        let mut shell = shell(transport, "x\n5\n");

        shell.delete_data().unwrap();

        let calls = shell.transport().calls();
        assert_eq!(calls[0].method, "GET");
        assert_eq!(calls[0].path, "delete_data?id=5");
    }

    #[test]
    fn run_stops_on_exit() {
        let mut shell = shell(FakeTransport::default(), "help\nbogus\nping\nexit\nget\n");
        let outcome = shell.run(&CancellationToken::new()).unwrap();
        assert_eq!(outcome, Shutdown::Exit);
        assert!(shell.transport().calls().is_empty());
    }

    #[test]
    fn run_continues_after_failed_command() {
        let transport = FakeTransport::default()
            .fail(ClientError::Unauthorized {
                path: "get_data".into(),
            })
            .reply("[]");
        let mut shell = shell(transport, "get\nget\n");

        let outcome = shell.run(&CancellationToken::new()).unwrap();
        assert_eq!(outcome, Shutdown::InputClosed);
        assert_eq!(shell.transport().calls().len(), 2);
    }

    #[test]
    fn run_honours_cancellation_before_reading() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut shell = shell(FakeTransport::default(), "get\n");

        assert_eq!(shell.run(&cancel).unwrap(), Shutdown::Cancelled);
        assert!(shell.transport().calls().is_empty());
    }

    #[test]
    fn run_ends_when_workflow_hits_end_of_input() {
        let mut shell = shell(FakeTransport::default(), "login\nalice\n");
        assert_eq!(shell.run(&CancellationToken::new()).unwrap(), Shutdown::InputClosed);
    }

    /// Collector whose command prompt fails the way a terminal read does.
    struct FailingCommand {
        cancel: Option<CancellationToken>,
        error: fn() -> ClientError,
    }

    impl InputCollector for FailingCommand {
        fn command(&mut self) -> Result<Option<String>> {
            if let Some(cancel) = &self.cancel {
                cancel.cancel();
            }
            Err((self.error)())
        }

        fn login(&mut self) -> Result<String> {
            Err(ClientError::InputClosed)
        }

        fn password(&mut self) -> Result<String> {
            Err(ClientError::InputClosed)
        }

        fn meta_info(&mut self) -> Result<String> {
            Err(ClientError::InputClosed)
        }

        fn text(&mut self) -> Result<String> {
            Err(ClientError::InputClosed)
        }

        fn record_id(&mut self) -> Result<u64> {
            Err(ClientError::InputClosed)
        }

        fn binary(&mut self) -> Result<Vec<u8>> {
            Err(ClientError::InputClosed)
        }

        fn record_kind(&mut self) -> Result<Option<RecordKind>> {
            Err(ClientError::InputClosed)
        }
    }

    fn interrupted_read() -> ClientError {
        ClientError::Input(std::io::Error::new(
            std::io::ErrorKind::Interrupted,
            "read interrupted",
        ))
    }

    #[test]
    fn run_treats_interrupted_read_after_signal_as_cancellation() {
        let cancel = CancellationToken::new();
        let input = FailingCommand {
            cancel: Some(cancel.clone()),
            error: interrupted_read,
        };
        let mut shell = Shell::new(FakeTransport::default(), input);

        assert_eq!(shell.run(&cancel).unwrap(), Shutdown::Cancelled);
        assert!(shell.transport().calls().is_empty());
    }

    #[test]
    fn run_treats_interrupted_prompt_as_cancellation() {
        let input = FailingCommand {
            cancel: None,
            error: || ClientError::Interrupted,
        };
        let mut shell = Shell::new(FakeTransport::default(), input);
        assert_eq!(shell.run(&CancellationToken::new()).unwrap(), Shutdown::Cancelled);
    }

    #[test]
    fn run_ends_normally_when_command_source_closes() {
        let input = FailingCommand {
            cancel: None,
            error: || ClientError::InputClosed,
        };
        let mut shell = Shell::new(FakeTransport::default(), input);
        assert_eq!(shell.run(&CancellationToken::new()).unwrap(), Shutdown::InputClosed);
    }

    #[test]
    fn run_returns_other_command_read_errors() {
        let input = FailingCommand {
            cancel: None,
            error: || {
                ClientError::Input(std::io::Error::new(std::io::ErrorKind::Other, "tty gone"))
            },
        };
        let mut shell = Shell::new(FakeTransport::default(), input);
        assert!(matches!(
            shell.run(&CancellationToken::new()),
            Err(ClientError::Input(_))
        ));
    }
}
