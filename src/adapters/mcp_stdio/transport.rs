use serde_json::Value;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter,
};

use crate::adapters::mcp_stdio::rpc::RpcEnvelope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TransportMode {
    /// `Content-Length` headers, blank line, body.
    Framed,
    /// One JSON document per line.
    JsonLine,
}

fn parse_content_length(headers: &[String], max_frame_bytes: usize) -> anyhow::Result<usize> {
    let mut content_length: Option<usize> = None;
    for line in headers {
        let (name, raw_value) = line
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("invalid frame header '{}'", line))?;
        if !name.trim().eq_ignore_ascii_case("content-length") {
            continue;
        }
        let length = raw_value
            .trim()
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("invalid Content-Length value"))?;
        if length > max_frame_bytes {
            return Err(anyhow::anyhow!(
                "frame too large: {} bytes (max {})",
                length,
                max_frame_bytes
            ));
        }
        content_length = Some(length);
    }

    content_length.ok_or_else(|| anyhow::anyhow!("missing Content-Length header"))
}

/// Read one message, detecting the transport from its first byte: `{` or `[`
/// starts a JSON line, anything else starts a header block.
pub(super) async fn read_next_message<R>(
    reader: &mut BufReader<R>,
    max_frame_bytes: usize,
) -> anyhow::Result<Option<(String, TransportMode)>>
where
    R: AsyncRead + Unpin,
{
    let first = loop {
        let mut one = [0u8; 1];
        if reader.read(&mut one).await? == 0 {
            return Ok(None);
        }
        if !one[0].is_ascii_whitespace() {
            break one[0];
        }
    };

    if first == b'{' || first == b'[' {
        let line = read_bounded_line(reader, vec![first], max_frame_bytes).await?;
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.len() > max_frame_bytes {
            return Err(anyhow::anyhow!(
                "message too large: {} bytes (max {})",
                trimmed.len(),
                max_frame_bytes
            ));
        }
        serde_json::from_str::<Value>(trimmed)
            .map_err(|e| anyhow::anyhow!("invalid JSON message: {}", e))?;
        return Ok(Some((trimmed.to_string(), TransportMode::JsonLine)));
    }

    let first_line = read_bounded_line(reader, vec![first], max_frame_bytes).await?;
    let mut headers = vec![first_line.trim_end_matches(['\r', '\n']).to_string()];

    loop {
        let line = read_bounded_line(reader, Vec::new(), max_frame_bytes).await?;
        if line.is_empty() {
            return Err(anyhow::anyhow!(
                "unexpected EOF while reading frame headers"
            ));
        }
        let header = line.trim_end_matches(['\r', '\n']);
        if header.trim().is_empty() {
            break;
        }
        if !header.contains(':') {
            return Err(anyhow::anyhow!("invalid frame header '{}'", header));
        }
        headers.push(header.to_string());
    }

    let length = parse_content_length(&headers, max_frame_bytes)?;
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).await?;
    Ok(Some((
        String::from_utf8_lossy(&body).into_owned(),
        TransportMode::Framed,
    )))
}

/// Read up to and including the next `\n`, appending to `buf`. Lines longer
/// than `max_bytes` (plus a CRLF) are rejected without buffering the rest.
async fn read_bounded_line<R>(
    reader: &mut BufReader<R>,
    mut buf: Vec<u8>,
    max_bytes: usize,
) -> anyhow::Result<String>
where
    R: AsyncRead + Unpin,
{
    let limit = max_bytes.saturating_add(2);
    let budget = limit.saturating_sub(buf.len()) as u64;
    (&mut *reader).take(budget).read_until(b'\n', &mut buf).await?;
    if buf.len() >= limit && buf.last() != Some(&b'\n') {
        return Err(anyhow::anyhow!(
            "incoming frame too large: line exceeds {} bytes",
            max_bytes
        ));
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub(super) async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut BufWriter<W>,
    envelope: &RpcEnvelope,
    mode: TransportMode,
) -> anyhow::Result<()> {
    let body = serde_json::to_vec(envelope)?;
    match mode {
        TransportMode::Framed => {
            let header = format!("Content-Length: {}\r\n\r\n", body.len());
            writer.write_all(header.as_bytes()).await?;
            writer.write_all(&body).await?;
        }
        TransportMode::JsonLine => {
            writer.write_all(&body).await?;
            writer.write_all(b"\n").await?;
        }
    }
    writer.flush().await?;
    Ok(())
}
