//! Decoding of `<z>.z/<y>-<numblocks>.blocks` payload trees and their
//! upload to a DVID block endpoint.

pub mod abort_token;
pub mod block;
pub mod client;
pub mod endpoint;
pub mod errors;
pub mod report;
pub mod scan;
pub mod upload;
pub mod vector3;
