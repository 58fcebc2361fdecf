use crate::{block::BlockRef, errors::EndpointError};

/// A DVID data instance that block payloads are posted to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub server: String,
    pub uuid: String,
    pub instance: String
}

impl Endpoint {
    /// * `server` - base URL, `host:port` gets `http://` prepended
    /// * `uuid` - version node of the repository
    /// * `instance` - name of the data instance
    pub fn new(server: &str, uuid: &str, instance: &str) -> Result<Self, EndpointError> {
        let server = server.trim().trim_end_matches('/');
        if server.is_empty() {
            return Err(EndpointError::Empty("server"));
        }
        if uuid.trim().is_empty() {
            return Err(EndpointError::Empty("uuid"));
        }
        if instance.trim().is_empty() {
            return Err(EndpointError::Empty("instance"));
        }

        let server = if server.contains("://") {
            server.to_string()
        } else {
            format!("http://{}", server)
        };

        return Ok(Self {
            server,
            uuid: uuid.trim().to_string(),
            instance: instance.trim().to_string()
        });
    }

    /// `{server}/api/node/{uuid}/{instance}/blocks/0_{y}_{z}/{numblocks}`
    pub fn block_url(&self, block: &BlockRef) -> String {
        return format!(
            "{}/api/node/{}/{}/blocks/{}/{}",
            self.server,
            self.uuid,
            self.instance,
            block.coord().to_dvid_coord(),
            block.num_blocks
        );
    }
}
