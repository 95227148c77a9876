//! Native messaging protocol
//!
//! One length-prefixed JSON request in on stdin, one length-prefixed JSON
//! response out on stdout, then the process exits.
//!
//! ## Module Structure
//! - `message`: the request bag and the response type
//! - `io`: frame reading and writing

mod io;
mod message;

pub use io::{
    encode_frame, log_preview, parse_request, read_frame, read_message, read_request,
    send_response, write_message, LENGTH_PREFIX_BYTES, MAX_RESPONSE_BYTES,
};
pub use message::{keys, Request, Response, ResultStatus};
