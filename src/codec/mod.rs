mod codec;
mod errors;

pub use codec::{Codec, JsonCodec, decode_message, encode_message};
pub use errors::CodecError;
