//! Serializer capability.
//!
//! A serializer converts values to and from byte streams. Streams follow
//! ownership: a stream passed by value is closed (dropped) on every exit path,
//! while passing `&mut stream` leaves it open for the caller.

use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while encoding or decoding a value.
#[derive(Debug, Error)]
pub enum SerializeError {
  /// The value could not be encoded.
  #[error("{codec} encode failed: {message}")]
  Encode { codec: Codec, message: String },

  /// The bytes do not decode as the requested type.
  #[error("{codec} decode failed: {message}")]
  Decode { codec: Codec, message: String },

  /// The underlying stream failed.
  #[error("serializer stream error: {0}")]
  Io(#[from] io::Error),

  #[error("unknown serializer {0:?} (expected json, json-pretty, or cbor)")]
  Unknown(String),
}

/// Converts values to and from byte streams.
pub trait Serializer {
  fn name(&self) -> &'static str;

  /// Encodes `value` into `writer` and flushes it.
  fn serialize_into<T, W>(&self, writer: W, value: &T) -> Result<(), SerializeError>
  where
    T: Serialize + ?Sized,
    W: Write;

  fn deserialize_from<T, R>(&self, reader: R) -> Result<T, SerializeError>
  where
    T: DeserializeOwned,
    R: Read;
}

/// Built-in codecs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Codec {
  #[default]
  Json,
  JsonPretty,
  Cbor,
}

impl Codec {
  pub fn as_str(&self) -> &'static str {
    match self {
      Codec::Json => "json",
      Codec::JsonPretty => "json-pretty",
      Codec::Cbor => "cbor",
    }
  }

  fn encode_err(self, message: impl fmt::Display) -> SerializeError {
    SerializeError::Encode {
      codec: self,
      message: message.to_string(),
    }
  }

  fn decode_err(self, message: impl fmt::Display) -> SerializeError {
    SerializeError::Decode {
      codec: self,
      message: message.to_string(),
    }
  }
}

impl Serializer for Codec {
  fn name(&self) -> &'static str {
    self.as_str()
  }

  fn serialize_into<T, W>(&self, mut writer: W, value: &T) -> Result<(), SerializeError>
  where
    T: Serialize + ?Sized,
    W: Write,
  {
    match self {
      Codec::Json => serde_json::to_writer(&mut writer, value).map_err(|e| self.encode_err(e))?,
      Codec::JsonPretty => serde_json::to_writer_pretty(&mut writer, value).map_err(|e| self.encode_err(e))?,
      // serde_cbor wants a sized value; `&T` is always sized.
      Codec::Cbor => serde_cbor::to_writer(&mut writer, &value).map_err(|e| self.encode_err(e))?,
    }
    writer.flush()?;
    Ok(())
  }

  fn deserialize_from<T, R>(&self, reader: R) -> Result<T, SerializeError>
  where
    T: DeserializeOwned,
    R: Read,
  {
    match self {
      Codec::Json | Codec::JsonPretty => serde_json::from_reader(reader).map_err(|e| self.decode_err(e)),
      Codec::Cbor => serde_cbor::from_reader(reader).map_err(|e| self.decode_err(e)),
    }
  }
}

impl fmt::Display for Codec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Codec {
  type Err = SerializeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "json" => Ok(Codec::Json),
      "json-pretty" | "pretty" => Ok(Codec::JsonPretty),
      "cbor" => Ok(Codec::Cbor),
      _ => Err(SerializeError::Unknown(s.to_string())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::BTreeMap;

  #[derive(Debug, PartialEq, Serialize, Deserialize)]
  struct Job {
    id: u32,
    tags: Vec<String>,
    weights: BTreeMap<String, f64>,
  }

  fn sample() -> Job {
    Job {
      id: 7,
      tags: vec!["a".into(), "b".into()],
      weights: BTreeMap::from([("x".to_string(), 0.5)]),
    }
  }

  #[test]
  fn every_codec_reads_back_its_own_output() {
    for codec in [Codec::Json, Codec::JsonPretty, Codec::Cbor] {
      let mut buf = Vec::new();
      codec.serialize_into(&mut buf, &sample()).unwrap();
      let back: Job = codec.deserialize_from(buf.as_slice()).unwrap();
      assert_eq!(back, sample(), "{codec}");
    }
  }

  #[test]
  fn unsized_values_encode_with_every_codec() {
    let items: &[u32] = &[3, 1, 4];
    for codec in [Codec::Json, Codec::JsonPretty, Codec::Cbor] {
      let mut buf = Vec::new();
      codec.serialize_into(&mut buf, items).unwrap();
      let back: Vec<u32> = codec.deserialize_from(buf.as_slice()).unwrap();
      assert_eq!(back, items, "{codec}");

      let mut buf = Vec::new();
      codec.serialize_into(&mut buf, "loose str").unwrap();
      let back: String = codec.deserialize_from(buf.as_slice()).unwrap();
      assert_eq!(back, "loose str", "{codec}");
    }
  }

  #[test]
  fn borrowed_stream_stays_usable() {
    let mut buf = Vec::new();
    Codec::Json.serialize_into(&mut buf, &1u8).unwrap();
    buf.extend_from_slice(b" trailing");
    assert!(buf.starts_with(b"1 "));
  }

  #[test]
  fn pretty_json_is_multiline() {
    let mut buf = Vec::new();
    Codec::JsonPretty.serialize_into(&mut buf, &sample()).unwrap();
    assert!(String::from_utf8(buf).unwrap().contains('\n'));
  }

  #[test]
  fn wrong_type_is_a_decode_error() {
    let mut buf = Vec::new();
    Codec::Json.serialize_into(&mut buf, &"not a job").unwrap();
    let err = Codec::Json.deserialize_from::<Job, _>(buf.as_slice()).unwrap_err();
    assert!(matches!(err, SerializeError::Decode { codec: Codec::Json, .. }));
  }

  #[test]
  fn parse_names() {
    assert_eq!("json".parse::<Codec>().unwrap(), Codec::Json);
    assert_eq!("JSON-Pretty".parse::<Codec>().unwrap(), Codec::JsonPretty);
    assert_eq!(" cbor ".parse::<Codec>().unwrap(), Codec::Cbor);
    assert!(matches!("yaml".parse::<Codec>(), Err(SerializeError::Unknown(_))));
    assert_eq!(Codec::default(), Codec::Json);
  }

  #[test]
  fn display_matches_serde_name() {
    for codec in [Codec::Json, Codec::JsonPretty, Codec::Cbor] {
      let json = serde_json::to_string(&codec).unwrap();
      assert_eq!(json, format!("\"{codec}\""));
    }
  }
}
