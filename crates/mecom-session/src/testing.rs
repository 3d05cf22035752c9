//! In-process fake controller for session tests.

use std::os::unix::net::UnixStream;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bytes::BytesMut;
use mecom_frame::field::encode_u32;
use mecom_frame::{encode_checksum, Command, Field, FrameError, FrameReader, FrameWriter, Header};

/// Host-side read timeout; matches the response timeout used in tests.
pub(crate) const TEST_TIMEOUT: Duration = Duration::from_millis(200);

pub(crate) type HostHalves = (FrameReader<UnixStream>, FrameWriter<UnixStream>);

pub(crate) enum Reply {
    Value(Field),
    /// Answer only after a delay.
    Late(Duration, Field),
    Uint(u32),
    Ack,
    Raw(Vec<u8>),
    Silent,
}

pub(crate) fn pair() -> (HostHalves, UnixStream) {
    let (host, device) = UnixStream::pair().unwrap();
    host.set_read_timeout(Some(TEST_TIMEOUT)).unwrap();
    let reader = FrameReader::new(host.try_clone().unwrap());
    let writer = FrameWriter::new(host);
    ((reader, writer), device)
}

/// Answer requests until the host hangs up; returns every request seen.
pub(crate) fn spawn_device<F>(
    device: UnixStream,
    mut handler: F,
) -> JoinHandle<Vec<(Header, Command)>>
where
    F: FnMut(&Header, &Command) -> Reply + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = FrameReader::new(device.try_clone().unwrap());
        let mut writer = FrameWriter::new(device);
        let mut seen = Vec::new();
        loop {
            let (header, command) = match reader.read_request() {
                Ok(req) => req,
                Err(FrameError::ConnectionClosed) => break,
                Err(err) => panic!("fake device got a bad request: {err}"),
            };
            assert_eq!(reader.buffered_len(), 0, "request arrived mid-exchange");
            seen.push((header, command));

            let reply_header = Header::device(header.address, header.sequence);
            let sent = match handler(&header, &command) {
                Reply::Value(field) => writer.write_response(&reply_header, Some(field)),
                Reply::Late(delay, field) => {
                    thread::sleep(delay);
                    writer.write_response(&reply_header, Some(field))
                }
                Reply::Ack => writer.write_response(&reply_header, None),
                Reply::Uint(value) => write_raw(&mut writer, &uint_line(&reply_header, value)),
                Reply::Raw(line) => write_raw(&mut writer, &line),
                Reply::Silent => Ok(()),
            };
            if sent.is_err() {
                break;
            }
        }
        seen
    })
}

/// A device line carrying a 32-bit integer value.
pub(crate) fn uint_line(header: &Header, value: u32) -> Vec<u8> {
    let mut body = BytesMut::new();
    body.extend_from_slice(&[header.control]);
    header.fields().iter().for_each(|f| f.encode(&mut body));
    encode_u32(value, &mut body);
    let mut line = body.clone();
    encode_checksum(&body, &mut line);
    line.extend_from_slice(b"\r");
    line.to_vec()
}

fn write_raw(writer: &mut FrameWriter<UnixStream>, line: &[u8]) -> mecom_frame::Result<()> {
    use std::io::Write;
    writer.get_mut().write_all(line)?;
    Ok(())
}

#[test]
fn uint_line_matches_known_vector() {
    assert_eq!(
        uint_line(&Header::device(2, 1), 1),
        b"!020001000000013B5F\r".to_vec()
    );
}
