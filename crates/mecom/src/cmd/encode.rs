use bytes::BytesMut;
use mecom_frame::{encode_request, Command, Header, CHECKSUM_LEN};
use serde::Serialize;

use crate::cmd::{Context, EncodeArgs, EncodeRequest};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print, printable_line, Render};

#[derive(Serialize)]
struct EncodeOutput {
    schema_id: &'static str,
    frame: String,
    checksum: String,
    length: usize,
    #[serde(skip)]
    wire: Vec<u8>,
}

impl Render for EncodeOutput {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("frame", self.frame.clone()),
            ("checksum", self.checksum.clone()),
            ("length", self.length.to_string()),
        ]
    }

    fn raw(&self) -> Vec<u8> {
        self.wire.clone()
    }
}

pub fn run(args: EncodeArgs, ctx: &Context) -> CliResult<i32> {
    let command = match args.request {
        EncodeRequest::Read {
            parameter,
            instance,
        } => Command::read(parameter, instance),
        EncodeRequest::Set {
            parameter,
            value,
            instance,
        } => Command::set(parameter, instance, value),
    };

    let out = encode(Header::host(args.address, args.sequence), &command)?;
    print(&out, ctx.format);
    Ok(SUCCESS)
}

fn encode(header: Header, command: &Command) -> CliResult<EncodeOutput> {
    let mut wire = BytesMut::new();
    encode_request(&header, command, &mut wire).map_err(|err| frame_error("encode failed", err))?;

    let frame = printable_line(&wire);
    let checksum = frame[frame.len() - CHECKSUM_LEN..].to_string();
    Ok(EncodeOutput {
        schema_id: "https://schemas.3leaps.dev/mecom/cli/v1/frame-encoded.schema.json",
        length: wire.len(),
        frame,
        checksum,
        wire: wire.to_vec(),
    })
}
