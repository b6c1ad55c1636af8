use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use super::error::ProbeError;
use super::types::{AttemptStage, SmtpEvent, SmtpReply};

/// Longest reply line accepted, CRLF included (RFC 5321 allows 512).
const MAX_LINE_LEN: usize = 1024;
/// Most lines accepted in one multi-line reply.
const MAX_REPLY_LINES: usize = 64;

/// Blocking SMTP connection to one exchange. Every command and reply is
/// appended to the transcript.
///
/// A whole reply, continuation lines included, must arrive within the
/// command timeout, so a conversation never outlives its fixed number of
/// commands times that timeout.
pub(crate) struct SmtpSession {
    host: String,
    stream: TcpStream,
    command_timeout: Duration,
    reader: BufReader<TcpStream>,
    transcript: Vec<SmtpEvent>,
}

impl SmtpSession {
    pub(crate) fn connect(
        host: &str,
        port: u16,
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<Self, ProbeError> {
        let addrs: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|err| ProbeError::unreachable(host, err))?
            .collect();

        let mut last_err = None;
        for addr in &addrs {
            match TcpStream::connect_timeout(addr, connect_timeout) {
                Ok(stream) => {
                    return Self::from_stream(host, stream, *addr, command_timeout)
                        .map_err(|err| ProbeError::unreachable(host, err));
                }
                Err(err) => {
                    tracing::debug!(host, %addr, error = %err, "connect failed");
                    last_err = Some(err);
                }
            }
        }
        let err = last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "no socket address available",
            )
        });
        Err(ProbeError::unreachable(host, err))
    }

    fn from_stream(
        host: &str,
        stream: TcpStream,
        addr: SocketAddr,
        command_timeout: Duration,
    ) -> io::Result<Self> {
        stream.set_read_timeout(Some(command_timeout))?;
        stream.set_write_timeout(Some(command_timeout))?;
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            host: host.to_string(),
            stream,
            command_timeout,
            reader,
            transcript: vec![SmtpEvent::Connected {
                host: host.to_string(),
                address: addr.to_string(),
            }],
        })
    }

    pub(crate) fn greeting(&mut self) -> Result<SmtpReply, ProbeError> {
        self.receive(AttemptStage::Greeting)
    }

    /// Send `command` and read its reply. Any reply code is returned as is;
    /// only I/O failures are errors.
    pub(crate) fn command(
        &mut self,
        stage: AttemptStage,
        command: &str,
    ) -> Result<SmtpReply, ProbeError> {
        tracing::debug!(host = %self.host, %stage, command, "smtp command");
        self.transcript.push(SmtpEvent::Sent {
            stage,
            command: command.to_string(),
        });
        if let Err(err) = self.send_line(command) {
            return Err(self.record_error(stage, err));
        }
        self.receive(stage)
    }

    /// Best-effort `RSET` and `QUIT`; failures are only recorded.
    pub(crate) fn close(&mut self) {
        for (stage, command) in [(AttemptStage::Rset, "RSET"), (AttemptStage::Quit, "QUIT")] {
            if self.command(stage, command).is_err() {
                break;
            }
        }
    }

    pub(crate) fn into_transcript(self) -> Vec<SmtpEvent> {
        self.transcript
    }

    fn receive(&mut self, stage: AttemptStage) -> Result<SmtpReply, ProbeError> {
        match self.read_reply() {
            Ok(reply) => {
                tracing::debug!(host = %self.host, %stage, code = reply.code, "smtp reply");
                self.transcript.push(SmtpEvent::Received {
                    stage,
                    reply: reply.clone(),
                });
                Ok(reply)
            }
            Err(err) => Err(self.record_error(stage, err)),
        }
    }

    fn record_error(&mut self, stage: AttemptStage, err: io::Error) -> ProbeError {
        self.transcript.push(SmtpEvent::Error {
            stage,
            message: err.to_string(),
        });
        ProbeError::io(stage, err)
    }

    fn send_line(&mut self, command: &str) -> io::Result<()> {
        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        self.stream.write_all(&line)?;
        self.stream.flush()
    }

    fn read_reply(&mut self) -> io::Result<SmtpReply> {
        let deadline = Instant::now() + self.command_timeout;
        let mut code = None;
        let mut message_lines = Vec::new();
        loop {
            if message_lines.len() == MAX_REPLY_LINES {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("SMTP reply longer than {MAX_REPLY_LINES} lines"),
                ));
            }
            let raw = self.read_line(deadline)?;
            let line = raw.trim_end_matches(['\r', '\n']);

            let parsed_code = line
                .get(..3)
                .and_then(|part| part.parse::<u16>().ok())
                .filter(|code| (100..600).contains(code))
                .ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("invalid SMTP reply: '{line}'"),
                    )
                })?;
            match code {
                Some(existing) if existing != parsed_code => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("inconsistent SMTP reply codes: {existing} vs {parsed_code}"),
                    ));
                }
                Some(_) => {}
                None => code = Some(parsed_code),
            }

            let continuation = line.as_bytes().get(3) == Some(&b'-');
            message_lines.push(line.get(4..).unwrap_or_default().to_string());
            if !continuation {
                return Ok(SmtpReply {
                    code: parsed_code,
                    message: message_lines.join("\n"),
                });
            }
        }
    }

    /// Read one line, giving up at `deadline` or past [`MAX_LINE_LEN`].
    fn read_line(&mut self, deadline: Instant) -> io::Result<String> {
        let mut line = Vec::new();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "SMTP reply not complete before the command timeout",
                ));
            }
            self.reader.get_ref().set_read_timeout(Some(remaining))?;

            let available = self.reader.fill_buf()?;
            if available.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed while reading reply",
                ));
            }
            let (used, complete) = match available.iter().position(|b| *b == b'\n') {
                Some(end) => (end + 1, true),
                None => (available.len(), false),
            };
            line.extend_from_slice(&available[..used]);
            self.reader.consume(used);

            if line.len() > MAX_LINE_LEN {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("SMTP reply line longer than {MAX_LINE_LEN} bytes"),
                ));
            }
            if complete {
                return String::from_utf8(line).map_err(|err| {
                    io::Error::new(io::ErrorKind::InvalidData, err.utf8_error())
                });
            }
        }
    }
}
