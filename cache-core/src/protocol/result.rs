//! The protocol's reply vocabulary and its wire rendering (§4.6).

/// The literal tokens the protocol defines, plus the integer form used by
/// `incr`/`decr` responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateCode {
    Stored,
    NotStored,
    End,
    Deleted,
    NotFound,
    Ok,
    Error,
    ClientError(String),
    Integer(i64),
    /// No trailing state token at all — `stats` is the only user of this;
    /// its four `STAT` lines are the entire reply.
    Empty,
}

impl StateCode {
    fn text(&self) -> String {
        match self {
            StateCode::Stored => "STORED".to_string(),
            StateCode::NotStored => "NOT_STORED".to_string(),
            StateCode::End => "END".to_string(),
            StateCode::Deleted => "DELETED".to_string(),
            StateCode::NotFound => "NOT_FOUND".to_string(),
            StateCode::Ok => "OK".to_string(),
            StateCode::Error => "ERROR".to_string(),
            StateCode::ClientError(msg) => format!("CLIENT_ERROR {}", msg),
            StateCode::Integer(n) => n.to_string(),
            StateCode::Empty => String::new(),
        }
    }
}

/// The result of dispatching a command: a state token plus optional data
/// that, when present, is rendered before the state and separated from it
/// by a line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub state: StateCode,
    pub data: Option<Vec<u8>>,
}

impl DispatchResult {
    pub fn new(state: StateCode) -> Self {
        Self { state, data: None }
    }

    pub fn with_data(state: StateCode, data: Vec<u8>) -> Self {
        Self {
            state,
            data: Some(data),
        }
    }

    /// Render `(data ∥ "\r\n" if data else "") ∥ text(state) ∥ "\r\n"`.
    /// `StateCode::Empty`'s text is the empty string, so a result carrying
    /// it renders as just the data plus its terminator, with no extra
    /// trailing line.
    pub fn render(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if let Some(data) = &self.data {
            out.extend_from_slice(data);
            out.extend_from_slice(b"\r\n");
        }
        let text = self.state.text();
        if !text.is_empty() {
            out.extend_from_slice(text.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_state_only() {
        let result = DispatchResult::new(StateCode::Stored);
        assert_eq!(result.render(), b"STORED\r\n");
    }

    #[test]
    fn renders_data_then_state() {
        let result = DispatchResult::with_data(StateCode::End, b"VALUE foo 0 3\r\nbar".to_vec());
        assert_eq!(result.render(), b"VALUE foo 0 3\r\nbar\r\nEND\r\n");
    }

    #[test]
    fn renders_client_error_with_message() {
        let result = DispatchResult::new(StateCode::ClientError("bad data chunk".to_string()));
        assert_eq!(result.render(), b"CLIENT_ERROR bad data chunk\r\n");
    }

    #[test]
    fn renders_integer() {
        let result = DispatchResult::new(StateCode::Integer(22));
        assert_eq!(result.render(), b"22\r\n");
    }

    #[test]
    fn empty_state_renders_data_with_no_trailing_token() {
        let result = DispatchResult::with_data(StateCode::Empty, b"STAT cmd_get 0".to_vec());
        assert_eq!(result.render(), b"STAT cmd_get 0\r\n");
    }
}
