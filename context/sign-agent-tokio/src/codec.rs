//! Wire encoding for the subset of the SSH agent protocol used to sign requests.
//!
//! Every message is a big-endian `u32` length followed by a one byte type and the
//! payload. Strings are a `u32` length followed by raw bytes.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use smartdc_core::{Error, Result};

pub const SSH_AGENT_FAILURE: u8 = 5;
pub const SSH_AGENTC_REQUEST_IDENTITIES: u8 = 11;
pub const SSH_AGENT_IDENTITIES_ANSWER: u8 = 12;
pub const SSH_AGENTC_SIGN_REQUEST: u8 = 13;
pub const SSH_AGENT_SIGN_RESPONSE: u8 = 14;

/// Upper bound for a single agent reply.
pub const MAX_MESSAGE_LEN: usize = 256 * 1024;

/// A key held by the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub key_blob: Bytes,
    pub comment: String,
}

pub fn encode_request_identities() -> Bytes {
    frame(SSH_AGENTC_REQUEST_IDENTITIES, &[])
}

pub fn encode_sign_request(key_blob: &[u8], data: &[u8], flags: u32) -> Bytes {
    let mut payload = BytesMut::with_capacity(key_blob.len() + data.len() + 12);
    put_string(&mut payload, key_blob);
    put_string(&mut payload, data);
    payload.put_u32(flags);
    frame(SSH_AGENTC_SIGN_REQUEST, &payload)
}

/// Decode the body of an identities answer (type byte already stripped).
pub fn decode_identities(mut body: Bytes) -> Result<Vec<Identity>> {
    let count = get_u32(&mut body)?;
    let mut identities = Vec::new();
    for _ in 0..count {
        let key_blob = get_string(&mut body)?;
        let comment = get_string(&mut body)?;
        identities.push(Identity {
            key_blob,
            comment: String::from_utf8_lossy(&comment).to_string(),
        });
    }
    Ok(identities)
}

/// Decode the body of a sign response into `(format, signature bytes)`.
pub fn decode_sign_response(mut body: Bytes) -> Result<(String, Bytes)> {
    let mut blob = get_string(&mut body)?;
    let format = get_string(&mut blob)?;
    let signature = get_string(&mut blob)?;
    Ok((String::from_utf8_lossy(&format).to_string(), signature))
}

/// Key type name stored at the head of a public key blob, e.g. `ssh-rsa`.
pub fn key_type(key_blob: &[u8]) -> Result<String> {
    let mut blob = Bytes::copy_from_slice(key_blob);
    let name = get_string(&mut blob)?;
    Ok(String::from_utf8_lossy(&name).to_string())
}

/// Map an SSH signature format to the HTTP signature algorithm name.
pub fn http_algorithm(format: &str) -> Option<&'static str> {
    match format {
        "ssh-rsa" => Some("rsa-sha1"),
        "rsa-sha2-256" => Some("rsa-sha256"),
        "rsa-sha2-512" => Some("rsa-sha512"),
        "ssh-dss" => Some("dsa-sha1"),
        "ecdsa-sha2-nistp256" => Some("ecdsa-sha256"),
        "ecdsa-sha2-nistp384" => Some("ecdsa-sha384"),
        "ecdsa-sha2-nistp521" => Some("ecdsa-sha512"),
        "ssh-ed25519" => Some("ed25519"),
        _ => None,
    }
}

pub fn frame(kind: u8, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(payload.len() + 5);
    buf.put_u32(payload.len() as u32 + 1);
    buf.put_u8(kind);
    buf.put_slice(payload);
    buf.freeze()
}

pub fn put_string(buf: &mut BytesMut, value: &[u8]) {
    buf.put_u32(value.len() as u32);
    buf.put_slice(value);
}

fn get_u32(buf: &mut Bytes) -> Result<u32> {
    if buf.remaining() < 4 {
        return Err(Error::unexpected("ssh agent message truncated"));
    }
    Ok(buf.get_u32())
}

fn get_string(buf: &mut Bytes) -> Result<Bytes> {
    let len = get_u32(buf)? as usize;
    if buf.remaining() < len {
        return Err(Error::unexpected("ssh agent string truncated"));
    }
    Ok(buf.split_to(len))
}
