//! Messages delivered by a stream session.

use crate::core::error::StreamError;
use bytes::Bytes;

/// One entry of a session's delivery queue.
///
/// Either the payload of a framed message (raw bytes, or whatever the decode
/// hook produced) or the error that took its place. A session delivers at
/// most one terminal error, always last; decode errors are not terminal.
#[derive(Debug)]
pub enum StreamMessage<T = Bytes> {
    Data(T),
    Error(StreamError),
}

impl<T> StreamMessage<T> {
    #[inline]
    pub fn data(&self) -> Option<&T> {
        match self {
            StreamMessage::Data(data) => Some(data),
            StreamMessage::Error(_) => None,
        }
    }

    #[inline]
    pub fn error(&self) -> Option<&StreamError> {
        match self {
            StreamMessage::Data(_) => None,
            StreamMessage::Error(err) => Some(err),
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, StreamMessage::Error(_))
    }

    /// Whether this message ends the session.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamMessage::Error(err) if err.is_terminal())
    }

    pub fn into_result(self) -> Result<T, StreamError> {
        self.into()
    }
}

impl<T> From<StreamMessage<T>> for Result<T, StreamError> {
    fn from(message: StreamMessage<T>) -> Self {
        match message {
            StreamMessage::Data(data) => Ok(data),
            StreamMessage::Error(err) => Err(err),
        }
    }
}

impl<T> From<Result<T, StreamError>> for StreamMessage<T> {
    fn from(result: Result<T, StreamError>) -> Self {
        match result {
            Ok(data) => StreamMessage::Data(data),
            Err(err) => StreamMessage::Error(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_message() {
        let message = StreamMessage::Data(Bytes::from_static(b"hello"));
        assert_eq!(message.data().unwrap(), &Bytes::from_static(b"hello"));
        assert!(message.error().is_none());
        assert!(!message.is_terminal());
    }

    #[test]
    fn test_decode_error_is_not_terminal() {
        let message: StreamMessage = StreamMessage::Error(StreamError::Decode("eof".into()));
        assert!(message.is_error());
        assert!(!message.is_terminal());
    }

    #[test]
    fn test_end_of_stream_is_terminal() {
        let message: StreamMessage = StreamMessage::Error(StreamError::EndOfStream);
        assert!(message.is_terminal());
        assert!(matches!(message.into_result(), Err(StreamError::EndOfStream)));
    }
}
