use crate::error::KeyError;

/**
    Strip PEM framing and decode the base64 body to DER.

    Every line containing `-----` (the BEGIN/END markers) is dropped, the
    remaining lines are trimmed and joined, then decoded as standard base64.
    Headers such as `Proc-Type:` are not supported; encrypted PEM is not a
    valid input.
*/
pub fn pem_to_der(pem: &str) -> Result<Vec<u8>, KeyError> {
    let mut has_marker = false;
    let mut body = String::with_capacity(pem.len());
    for line in pem.lines() {
        if line.contains("-----") {
            has_marker = true;
            continue;
        }
        body.push_str(line.trim());
    }

    if !has_marker {
        return Err(KeyError::Pem("missing -----BEGIN/END----- framing".into()));
    }
    if body.is_empty() {
        return Err(KeyError::Pem("empty body".into()));
    }

    data_encoding::BASE64
        .decode(body.as_bytes())
        .map_err(|e| KeyError::InvalidBase64(e.to_string()))
}
