//! Incremental decoding of JSON arrays.
//!
//! Payloads are top-level arrays of records. Records are deserialized one
//! at a time and handed to a sink, so the whole list is never materialized.
//! The cancellation token is checked before each record.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, DeserializeOwned, SeqAccess, Visitor};
use tokio_util::sync::CancellationToken;

use super::error::ProtocolError;

/// Feeds every element of the top-level JSON array in `bytes` to `sink`.
///
/// Returns the number of elements delivered.
///
/// # Errors
///
/// Returns `ProtocolError::Decode` for malformed JSON or trailing data,
/// `ProtocolError::Cancelled` when the token fires, or whatever error the
/// sink returned.
pub fn for_each_element<T, F>(
    bytes: &[u8],
    cancel: &CancellationToken,
    mut sink: F,
) -> Result<usize, ProtocolError>
where
    T: DeserializeOwned,
    F: FnMut(T) -> Result<(), ProtocolError>,
{
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let mut failure = None;
    let visitor = ElementVisitor {
        cancel,
        sink: &mut sink,
        failure: &mut failure,
        marker: PhantomData,
    };

    match de::Deserializer::deserialize_seq(&mut deserializer, visitor) {
        Ok(count) => {
            deserializer.end()?;
            Ok(count)
        }
        Err(err) => Err(failure.unwrap_or_else(|| ProtocolError::from(err))),
    }
}

struct ElementVisitor<'a, T, F> {
    cancel: &'a CancellationToken,
    sink: &'a mut F,
    failure: &'a mut Option<ProtocolError>,
    marker: PhantomData<fn() -> T>,
}

impl<'de, T, F> Visitor<'de> for ElementVisitor<'_, T, F>
where
    T: DeserializeOwned,
    F: FnMut(T) -> Result<(), ProtocolError>,
{
    type Value = usize;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an array of records")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut count = 0;
        loop {
            if self.cancel.is_cancelled() {
                *self.failure = Some(ProtocolError::Cancelled);
                return Err(de::Error::custom("cancelled"));
            }
            let Some(element) = seq.next_element::<T>()? else {
                break;
            };
            if let Err(err) = (self.sink)(element) {
                let message = err.to_string();
                *self.failure = Some(err);
                return Err(de::Error::custom(message));
            }
            count += 1;
        }
        Ok(count)
    }
}
