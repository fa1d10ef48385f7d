//! Minimal rosbag v2.0 demultiplexer.
//!
//! Reads just enough of the bag container to pull raw `sensor_msgs/Image`
//! messages off image-bearing topics: record framing, connection records,
//! uncompressed chunks, and message data records. Compressed chunks and
//! pixel encodings we cannot handle are logged and skipped — partial
//! ingestion is an accepted outcome.
//!
//! Container reference: <http://wiki.ros.org/Bags/Format/2.0>.

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use async_trait::async_trait;

use lens_core::imagery::{self, PixelEncoding};

use crate::error::ExtractError;
use crate::source::{ExtractedFrame, FrameSource};

const MAGIC: &[u8] = b"#ROSBAG V2.0\n";

/// Message type carried by image topics.
const IMAGE_MSG_TYPE: &str = "sensor_msgs/Image";

// Record opcodes.
const OP_MESSAGE_DATA: u8 = 0x02;
const OP_CHUNK: u8 = 0x05;
const OP_CONNECTION: u8 = 0x07;

/// A raw image message pulled out of the container, not yet decoded.
#[derive(Debug)]
struct RawImageMessage {
    topic: String,
    bytes: Vec<u8>,
}

/// Frame source backed by a rosbag file.
///
/// The container is demultiplexed up front (connections resolved, image
/// messages collected in recorded order); pixel decoding happens lazily
/// per frame so a bad message only costs its own frame.
pub struct BagFrameSource {
    pending: VecDeque<RawImageMessage>,
}

impl BagFrameSource {
    /// Read and demultiplex `bag_path`.
    pub async fn open(bag_path: &Path) -> Result<Self, ExtractError> {
        let buf = tokio::fs::read(bag_path).await?;
        let messages = demux_image_messages(&buf)?;
        tracing::info!(
            bag = %bag_path.display(),
            image_messages = messages.len(),
            "bag demux complete"
        );
        Ok(Self {
            pending: messages.into(),
        })
    }
}

#[async_trait]
impl FrameSource for BagFrameSource {
    async fn next_frame(&mut self) -> Result<Option<ExtractedFrame>, ExtractError> {
        while let Some(msg) = self.pending.pop_front() {
            match decode_image_message(&msg.topic, &msg.bytes) {
                Ok(frame) => return Ok(Some(frame)),
                Err(e) => {
                    tracing::warn!(topic = %msg.topic, error = %e, "skipping undecodable image message");
                }
            }
        }
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Container parsing
// ---------------------------------------------------------------------------

/// Walk the container and collect raw messages from `sensor_msgs/Image`
/// connections, in recorded order.
fn demux_image_messages(buf: &[u8]) -> Result<Vec<RawImageMessage>, ExtractError> {
    let Some(rest) = buf.strip_prefix(MAGIC) else {
        return Err(ExtractError::MalformedBag(
            "missing rosbag v2.0 magic".into(),
        ));
    };

    // conn id -> topic, for image connections only.
    let mut image_topics: HashMap<u32, String> = HashMap::new();
    let mut messages = Vec::new();

    let mut reader = ByteReader::new(rest);
    while !reader.is_empty() {
        let (header, data) = read_record(&mut reader)?;
        handle_record(&header, data, &mut image_topics, &mut messages)?;
    }

    Ok(messages)
}

fn handle_record(
    header: &HashMap<String, Vec<u8>>,
    data: &[u8],
    image_topics: &mut HashMap<u32, String>,
    messages: &mut Vec<RawImageMessage>,
) -> Result<(), ExtractError> {
    match header_u8(header, "op")? {
        OP_CONNECTION => {
            let conn = header_u32(header, "conn")?;
            // The connection header (with the message type) is a second
            // field block in the record's data section.
            let conn_header = read_fields(&mut ByteReader::new(data))?;
            let msg_type = header_string(&conn_header, "type")?;
            if msg_type == IMAGE_MSG_TYPE {
                let topic = header_string(&conn_header, "topic")?;
                image_topics.insert(conn, topic);
            }
        }
        OP_CHUNK => {
            let compression = header_string(header, "compression")?;
            if compression != "none" {
                tracing::warn!(%compression, "skipping compressed chunk");
                return Ok(());
            }
            // An uncompressed chunk's data is itself a sequence of records.
            let mut inner = ByteReader::new(data);
            while !inner.is_empty() {
                let (header, data) = read_record(&mut inner)?;
                handle_record(&header, data, image_topics, messages)?;
            }
        }
        OP_MESSAGE_DATA => {
            let conn = header_u32(header, "conn")?;
            if let Some(topic) = image_topics.get(&conn) {
                messages.push(RawImageMessage {
                    topic: topic.clone(),
                    bytes: data.to_vec(),
                });
            }
        }
        // Bag header, index, chunk info: nothing we need.
        _ => {}
    }
    Ok(())
}

/// Read one `header_len header data_len data` record.
fn read_record<'a>(
    reader: &mut ByteReader<'a>,
) -> Result<(HashMap<String, Vec<u8>>, &'a [u8]), ExtractError> {
    let header_bytes = reader.read_len_prefixed()?;
    let header = read_fields(&mut ByteReader::new(header_bytes))?;
    let data = reader.read_len_prefixed()?;
    Ok((header, data))
}

/// Read a `len name=value` field block to exhaustion.
fn read_fields(reader: &mut ByteReader<'_>) -> Result<HashMap<String, Vec<u8>>, ExtractError> {
    let mut fields = HashMap::new();
    while !reader.is_empty() {
        let field = reader.read_len_prefixed()?;
        let sep = field
            .iter()
            .position(|&b| b == b'=')
            .ok_or_else(|| ExtractError::MalformedBag("header field without '='".into()))?;
        let name = String::from_utf8_lossy(&field[..sep]).into_owned();
        fields.insert(name, field[sep + 1..].to_vec());
    }
    Ok(fields)
}

fn header_field<'a>(
    header: &'a HashMap<String, Vec<u8>>,
    name: &str,
) -> Result<&'a [u8], ExtractError> {
    header
        .get(name)
        .map(Vec::as_slice)
        .ok_or_else(|| ExtractError::MalformedBag(format!("missing header field '{name}'")))
}

fn header_u8(header: &HashMap<String, Vec<u8>>, name: &str) -> Result<u8, ExtractError> {
    match header_field(header, name)? {
        [b] => Ok(*b),
        other => Err(ExtractError::MalformedBag(format!(
            "field '{name}' has length {}, expected 1",
            other.len()
        ))),
    }
}

fn header_u32(header: &HashMap<String, Vec<u8>>, name: &str) -> Result<u32, ExtractError> {
    let bytes = header_field(header, name)?;
    let arr: [u8; 4] = bytes.try_into().map_err(|_| {
        ExtractError::MalformedBag(format!(
            "field '{name}' has length {}, expected 4",
            bytes.len()
        ))
    })?;
    Ok(u32::from_le_bytes(arr))
}

fn header_string(header: &HashMap<String, Vec<u8>>, name: &str) -> Result<String, ExtractError> {
    Ok(String::from_utf8_lossy(header_field(header, name)?).into_owned())
}

// ---------------------------------------------------------------------------
// sensor_msgs/Image decoding
// ---------------------------------------------------------------------------

/// Decode a serialized `sensor_msgs/Image` into a PNG-encoded frame.
///
/// Layout (little-endian ROS serialization): std_msgs/Header (seq, stamp,
/// frame_id), then height, width, encoding, is_bigendian, step, data.
fn decode_image_message(topic: &str, bytes: &[u8]) -> Result<ExtractedFrame, ExtractError> {
    let mut r = ByteReader::new(bytes);

    let _seq = r.read_u32()?;
    let _stamp_secs = r.read_u32()?;
    let _stamp_nsecs = r.read_u32()?;
    let _frame_id = r.read_len_prefixed()?;

    let height = r.read_u32()?;
    let width = r.read_u32()?;
    let encoding = String::from_utf8_lossy(r.read_len_prefixed()?).into_owned();
    let _is_bigendian = r.read_u8()?;
    let step = r.read_u32()?;
    let pixels = r.read_len_prefixed()?;

    let encoding = PixelEncoding::parse(&encoding)
        .map_err(|e| ExtractError::MalformedBag(e.to_string()))?;
    let png = imagery::encode_png(width, height, step as usize, encoding, pixels)
        .map_err(|e| ExtractError::MalformedBag(e.to_string()))?;

    Ok(ExtractedFrame {
        stream: topic.to_string(),
        data: png,
        media_type: "image/png".to_string(),
        width,
        height,
    })
}

// ---------------------------------------------------------------------------
// Byte cursor
// ---------------------------------------------------------------------------

struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn read_exact(&mut self, n: usize) -> Result<&'a [u8], ExtractError> {
        let end = self.pos.checked_add(n).filter(|&e| e <= self.buf.len());
        let Some(end) = end else {
            return Err(ExtractError::MalformedBag(format!(
                "unexpected end of data at offset {}",
                self.pos
            )));
        };
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, ExtractError> {
        Ok(self.read_exact(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, ExtractError> {
        let bytes: [u8; 4] = self.read_exact(4)?.try_into().expect("slice length is 4");
        Ok(u32::from_le_bytes(bytes))
    }

    /// Read a `u32 length` prefix followed by that many bytes.
    fn read_len_prefixed(&mut self) -> Result<&'a [u8], ExtractError> {
        let len = self.read_u32()? as usize;
        self.read_exact(len)
    }
}
