//! Single-recipient SMTP probe.
//!
//! Connects to the preferred exchange of the recipient's domain and runs
//! greeting, `EHLO` (falling back to `HELO`), `MAIL FROM` and `RCPT TO`,
//! then `RSET`/`QUIT`. `DATA` is never sent. Only the `RCPT TO` reply can
//! produce a definite verdict; everything else ends as
//! [`ProbeOutcome::Unknown`].

mod error;
mod options;
mod session;
mod types;

pub use options::ProbeOptions;
pub use types::{AttemptStage, ProbeOutcome, ProbeResult, SmtpEvent, SmtpReply};

use crate::error::{Error, Failure, FailureKind};
use crate::identifier::{bare_address, normalize_identifier};
use crate::mx::{LookupMx, MxResolver, MxStatus, ResolverOptions};

use error::ProbeError;
use session::SmtpSession;

/// Probe `address` using the system resolver.
pub fn mxprobe(address: &str, options: &ProbeOptions) -> Result<ProbeResult, Error> {
    options.validate()?;
    let resolver = MxResolver::from_system_conf(&ResolverOptions::default())?;
    Ok(probe_with(&resolver, address, options))
}

/// Probe `address`, resolving its exchanges through `resolver`.
///
/// Never fails: invalid addresses, DNS failures and unreachable servers are
/// reported as [`ProbeOutcome::Unknown`] with [`ProbeResult::failure`] set.
pub fn probe_with<R: LookupMx>(
    resolver: &MxResolver<R>,
    address: &str,
    options: &ProbeOptions,
) -> ProbeResult {
    let (local, domain) = match split_address(address) {
        Ok(parts) => parts,
        Err(detail) => {
            return ProbeResult::unknown(
                address,
                Failure::new(FailureKind::InvalidIdentifier, detail),
            );
        }
    };

    let lookup = match resolver.resolve(&domain) {
        Ok(lookup) => lookup,
        Err(err) => return ProbeResult::unknown(address, Failure::from(&err)),
    };
    let hosts: Vec<&str> = lookup.exchanges().take(options.max_hosts.max(1)).collect();
    if hosts.is_empty() {
        let failure = match lookup.status {
            MxStatus::NoSuchDomain => {
                Failure::new(FailureKind::NoSuchDomain, format!("{domain} does not exist"))
            }
            MxStatus::Unresolvable => {
                Failure::new(FailureKind::Unresolvable, format!("{domain} has no mail server"))
            }
            MxStatus::Records | MxStatus::SelfHosted => Failure::new(
                FailureKind::SmtpUnreachable,
                format!("{domain} publishes a null MX"),
            ),
        };
        return ProbeResult::unknown(address, failure);
    }

    let recipient = format!("{local}@{domain}");
    let mut result = ProbeResult::new(address);
    for host in hosts {
        let (attempt, transcript) = probe_host(host, &recipient, options);
        result.host = Some(host.to_string());
        result.transcript.extend(transcript);
        match attempt {
            Ok(reply) => {
                result.outcome = classify_rcpt(&reply);
                result.code = Some(reply.code);
                result.detail = reply.to_string();
                result.failure = None;
                return result;
            }
            Err(err) => {
                tracing::warn!(host, stage = %err.stage(), error = %err, "SMTP probe failed");
                result.code = err.reply().map(|reply| reply.code);
                result.detail = err.to_string();
                result.failure = Some(Failure::new(err.failure_kind(), err.to_string()));
                if !err.is_unreachable() {
                    return result;
                }
            }
        }
    }
    result
}

/// Verdict from the reply to `RCPT TO`.
pub(crate) fn classify_rcpt(reply: &SmtpReply) -> ProbeOutcome {
    if reply.is_positive_completion() {
        ProbeOutcome::Valid
    } else if reply.is_transient_failure() {
        ProbeOutcome::SoftFail
    } else if reply.is_permanent_failure() {
        ProbeOutcome::HardFail
    } else {
        ProbeOutcome::Unknown
    }
}

/// Run the conversation with one exchange. Returns the `RCPT TO` reply, or
/// why no verdict was reached, plus the transcript either way.
fn probe_host(
    host: &str,
    recipient: &str,
    options: &ProbeOptions,
) -> (Result<SmtpReply, ProbeError>, Vec<SmtpEvent>) {
    let mut session = match SmtpSession::connect(
        host,
        options.port,
        options.connect_timeout,
        options.command_timeout,
    ) {
        Ok(session) => session,
        Err(err) => {
            let event = SmtpEvent::Error {
                stage: AttemptStage::Connect,
                message: err.to_string(),
            };
            return (Err(err), vec![event]);
        }
    };

    let outcome = converse(&mut session, recipient, options);
    match &outcome {
        Err(ProbeError::Timeout { .. } | ProbeError::Io { .. }) => {}
        _ => session.close(),
    }
    (outcome, session.into_transcript())
}

fn converse(
    session: &mut SmtpSession,
    recipient: &str,
    options: &ProbeOptions,
) -> Result<SmtpReply, ProbeError> {
    expect_positive(AttemptStage::Greeting, session.greeting()?)?;

    let helo = options.helo_domain();
    let ehlo = session.command(AttemptStage::Ehlo, &format!("EHLO {helo}"))?;
    if !ehlo.is_positive_completion() {
        let reply = session.command(AttemptStage::Helo, &format!("HELO {helo}"))?;
        expect_positive(AttemptStage::Helo, reply)?;
    }

    let mail_from = format!("MAIL FROM:<{}>", options.sender);
    let reply = session.command(AttemptStage::MailFrom, &mail_from)?;
    expect_positive(AttemptStage::MailFrom, reply)?;

    session.command(AttemptStage::RcptTo, &format!("RCPT TO:<{recipient}>"))
}

fn expect_positive(stage: AttemptStage, reply: SmtpReply) -> Result<SmtpReply, ProbeError> {
    if reply.is_positive_completion() {
        Ok(reply)
    } else {
        Err(ProbeError::Unexpected { stage, reply })
    }
}

/// Split an address into its local part and normalised domain.
fn split_address(address: &str) -> Result<(String, String), String> {
    let bare = bare_address(address);
    let Some((local, _)) = bare.rsplit_once('@') else {
        return Err(format!("'{address}' is not an email address"));
    };
    if local.is_empty() || local.chars().any(|c| c.is_whitespace() || c == '<' || c == '>') {
        return Err(format!("'{address}' has an invalid local part"));
    }
    let domain = normalize_identifier(bare, false).map_err(|err| err.to_string())?;
    Ok((local.to_string(), domain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mx::tests::StubResolver;
    use std::io::{self, BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    fn spawn_mock_server(
        greeting: &'static str,
        script: Vec<(&'static str, &'static str)>,
    ) -> (u16, thread::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let port = listener.local_addr().expect("addr").port();
        let (ready_tx, ready_rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            ready_tx.send(()).ok();
            let mut seen = Vec::new();
            if let Ok((mut stream, _)) = listener.accept() {
                let _ = handle_session(&mut stream, greeting, script, &mut seen);
            }
            seen
        });
        ready_rx.recv().expect("server ready");
        (port, handle)
    }

    fn handle_session(
        stream: &mut TcpStream,
        greeting: &str,
        script: Vec<(&'static str, &'static str)>,
        seen: &mut Vec<String>,
    ) -> io::Result<()> {
        let mut reader = BufReader::new(stream.try_clone()?);
        stream.write_all(greeting.as_bytes())?;
        stream.flush()?;
        for (expected, response) in script {
            let mut line = String::new();
            reader.read_line(&mut line)?;
            seen.push(line.trim_end().to_string());
            assert!(
                line.starts_with(expected),
                "expected command starting with '{expected}', got '{line}'"
            );
            stream.write_all(response.as_bytes())?;
            stream.flush()?;
        }
        Ok(())
    }

    fn loopback_resolver() -> MxResolver<StubResolver> {
        MxResolver::new(StubResolver::new().mx("example.com", &[(10, "127.0.0.1")]))
    }

    fn options(port: u16) -> ProbeOptions {
        ProbeOptions {
            sender: "probe@sender.test".to_string(),
            port,
            connect_timeout: Duration::from_secs(2),
            command_timeout: Duration::from_millis(500),
            ..ProbeOptions::default()
        }
    }

    fn full_script(rcpt_reply: &'static str) -> Vec<(&'static str, &'static str)> {
        vec![
            ("EHLO sender.test", "250-mock.example\r\n250 PIPELINING\r\n"),
            ("MAIL FROM:<probe@sender.test>", "250 2.1.0 Ok\r\n"),
            ("RCPT TO:<user@example.com>", rcpt_reply),
            ("RSET", "250 2.0.0 Reset\r\n"),
            ("QUIT", "221 2.0.0 Bye\r\n"),
        ]
    }

    #[test]
    fn accepted_recipient_is_valid() {
        let (port, handle) = spawn_mock_server("220 mock ESMTP\r\n", full_script("250 2.1.5 Ok\r\n"));
        let result = probe_with(&loopback_resolver(), "User <user@example.com>", &options(port));
        assert_eq!(result.outcome, ProbeOutcome::Valid);
        assert_eq!(result.code, Some(250));
        assert_eq!(result.host.as_deref(), Some("127.0.0.1"));
        assert!(result.failure.is_none());
        let seen = handle.join().expect("server thread");
        assert_eq!(seen.last().map(String::as_str), Some("QUIT"));
        assert!(!seen.iter().any(|line| line.starts_with("DATA")));
    }

    #[test]
    fn permanent_rejection_is_hard_fail() {
        let (port, handle) =
            spawn_mock_server("220 mock ESMTP\r\n", full_script("550 5.1.1 User unknown\r\n"));
        let result = probe_with(&loopback_resolver(), "user@example.com", &options(port));
        assert_eq!(result.outcome, ProbeOutcome::HardFail);
        assert_eq!(result.code, Some(550));
        assert_eq!(result.detail, "550 5.1.1 User unknown");
        handle.join().expect("server thread");
    }

    #[test]
    fn transient_rejection_is_soft_fail() {
        let (port, handle) =
            spawn_mock_server("220 mock ESMTP\r\n", full_script("450 4.2.1 Try later\r\n"));
        let result = probe_with(&loopback_resolver(), "user@example.com", &options(port));
        assert_eq!(result.outcome, ProbeOutcome::SoftFail);
        assert_eq!(result.code, Some(450));
        handle.join().expect("server thread");
    }

    #[test]
    fn helo_fallback_when_ehlo_rejected() {
        let (port, handle) = spawn_mock_server(
            "220 old smtpd\r\n",
            vec![
                ("EHLO", "502 5.5.2 Command not recognized\r\n"),
                ("HELO sender.test", "250 old smtpd\r\n"),
                ("MAIL FROM:", "250 Ok\r\n"),
                ("RCPT TO:", "251 User not local; will forward\r\n"),
                ("RSET", "250 Ok\r\n"),
                ("QUIT", "221 Bye\r\n"),
            ],
        );
        let result = probe_with(&loopback_resolver(), "user@example.com", &options(port));
        assert_eq!(result.outcome, ProbeOutcome::Valid);
        assert_eq!(result.code, Some(251));
        handle.join().expect("server thread");
    }

    #[test]
    fn rejected_sender_is_unknown_not_hard_fail() {
        let (port, handle) = spawn_mock_server(
            "220 mock ESMTP\r\n",
            vec![
                ("EHLO", "250 mock\r\n"),
                ("MAIL FROM:", "553 5.7.1 Sender rejected\r\n"),
                ("RSET", "250 Ok\r\n"),
                ("QUIT", "221 Bye\r\n"),
            ],
        );
        let result = probe_with(&loopback_resolver(), "user@example.com", &options(port));
        assert_eq!(result.outcome, ProbeOutcome::Unknown);
        assert_eq!(result.code, Some(553));
        assert_eq!(
            result.failure.map(|f| f.kind),
            Some(FailureKind::SmtpUnreachable)
        );
        handle.join().expect("server thread");
    }

    #[test]
    fn silent_server_times_out_as_unknown() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let port = listener.local_addr().expect("addr").port();
        let handle = thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                // never greet; wait for the client to give up
                let mut buf = [0u8; 64];
                let _ = stream.read(&mut buf);
            }
        });

        let result = probe_with(&loopback_resolver(), "user@example.com", &options(port));
        assert_eq!(result.outcome, ProbeOutcome::Unknown);
        assert_eq!(result.failure.map(|f| f.kind), Some(FailureKind::SmtpTimeout));
        handle.join().expect("server thread");
    }

    #[test]
    fn endless_multiline_greeting_is_cut_off() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let port = listener.local_addr().expect("addr").port();
        let handle = thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                // keep the greeting open one line at a time until the client leaves
                for _ in 0..100 {
                    if stream.write_all(b"220-still greeting\r\n").is_err() {
                        break;
                    }
                    thread::sleep(Duration::from_millis(100));
                }
            }
        });

        let mut options = options(port);
        options.connect_timeout = Duration::from_millis(500);
        let started = std::time::Instant::now();
        let result = probe_with(&loopback_resolver(), "user@example.com", &options);
        let elapsed = started.elapsed();

        assert_eq!(result.outcome, ProbeOutcome::Unknown);
        assert_eq!(result.failure.map(|f| f.kind), Some(FailureKind::SmtpTimeout));
        assert!(elapsed < Duration::from_secs(3), "probe ran for {elapsed:?}");
        handle.join().expect("server thread");
    }

    #[test]
    fn oversized_reply_line_is_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let port = listener.local_addr().expect("addr").port();
        let handle = thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let line = format!("220 {}\r\n", "x".repeat(4096));
                let _ = stream.write_all(line.as_bytes());
                let mut buf = [0u8; 64];
                let _ = stream.read(&mut buf);
            }
        });

        let result = probe_with(&loopback_resolver(), "user@example.com", &options(port));
        assert_eq!(result.outcome, ProbeOutcome::Unknown);
        assert_eq!(
            result.failure.map(|f| f.kind),
            Some(FailureKind::SmtpUnreachable)
        );
        assert!(result.detail.contains("longer than"), "{}", result.detail);
        handle.join().expect("server thread");
    }

    #[test]
    fn refused_connection_is_unknown() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let result = probe_with(&loopback_resolver(), "user@example.com", &options(port));
        assert_eq!(result.outcome, ProbeOutcome::Unknown);
        assert_eq!(
            result.failure.map(|f| f.kind),
            Some(FailureKind::SmtpUnreachable)
        );
        assert!(matches!(
            result.transcript.first(),
            Some(SmtpEvent::Error {
                stage: AttemptStage::Connect,
                ..
            })
        ));
    }

    #[test]
    fn invalid_address_and_missing_mx_are_unknown() {
        let resolver = MxResolver::new(
            StubResolver::new()
                .mx("nullmx.test", &[(0, ".")])
                .fail("gone.test", crate::LookupError::NoSuchDomain),
        );
        let opts = ProbeOptions::default();

        let invalid = probe_with(&resolver, "not-an-address", &opts);
        assert_eq!(invalid.outcome, ProbeOutcome::Unknown);
        assert_eq!(
            invalid.failure.map(|f| f.kind),
            Some(FailureKind::InvalidIdentifier)
        );

        let null = probe_with(&resolver, "user@nullmx.test", &opts);
        assert_eq!(null.outcome, ProbeOutcome::Unknown);
        assert!(null.transcript.is_empty());

        let gone = probe_with(&resolver, "user@gone.test", &opts);
        assert_eq!(gone.failure.map(|f| f.kind), Some(FailureKind::NoSuchDomain));

        let unresolvable = probe_with(&resolver, "user@nowhere.test", &opts);
        assert_eq!(
            unresolvable.failure.map(|f| f.kind),
            Some(FailureKind::Unresolvable)
        );
    }

    #[test]
    fn rcpt_classification() {
        let reply = |code| SmtpReply {
            code,
            message: String::new(),
        };
        assert_eq!(classify_rcpt(&reply(250)), ProbeOutcome::Valid);
        assert_eq!(classify_rcpt(&reply(252)), ProbeOutcome::Valid);
        assert_eq!(classify_rcpt(&reply(421)), ProbeOutcome::SoftFail);
        assert_eq!(classify_rcpt(&reply(554)), ProbeOutcome::HardFail);
        assert_eq!(classify_rcpt(&reply(354)), ProbeOutcome::Unknown);
    }

    #[test]
    fn options_validation() {
        assert!(ProbeOptions::default().validate().is_ok());
        let zero_hosts = ProbeOptions {
            max_hosts: 0,
            ..ProbeOptions::default()
        };
        assert!(zero_hosts.validate().is_err());
        assert!(ProbeOptions::with_sender("a b@c").validate().is_err());
        assert_eq!(ProbeOptions::with_sender("me@corp.test").helo_domain(), "corp.test");
        assert_eq!(ProbeOptions::default().helo_domain(), "localhost");
    }
}
