use serde::{Deserialize, Serialize};

/// Response of `files/stat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilesStat {
    #[serde(rename = "Hash", default)]
    pub hash: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "CumulativeSize", default)]
    pub cumulative_size: u64,
    #[serde(rename = "Size", default)]
    pub size: u64,
}

/// A `{"/": "<cid>"}` IPLD link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTarget {
    #[serde(rename = "/")]
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpfsLink {
    #[serde(rename = "Hash")]
    pub hash: LinkTarget,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Tsize", default)]
    pub tsize: u64,
}

/// Response of `dag/get` for a dag-pb node; the data section is ignored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagGetResponse {
    #[serde(rename = "Links", default)]
    pub links: Vec<IpfsLink>,
}

/// One line of the newline delimited `add` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddEntry {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Hash")]
    pub hash: String,
    #[serde(rename = "Size", default)]
    pub size: String,
}

/// Body of a non-2xx response
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(rename = "Message")]
    pub message: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_decode_dag_get() {
        let raw = r#"{
            "Data": {"/": {"bytes": "CAE"}},
            "Links": [
                {"Hash": {"/": "QmA"}, "Name": "a.txt", "Tsize": 18},
                {"Hash": {"/": "QmB"}, "Name": "sub", "Tsize": 120}
            ]
        }"#;
        let response: DagGetResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.links.len(), 2);
        assert_eq!(response.links[1].hash.target, "QmB");
        assert_eq!(response.links[1].name, "sub");
        assert_eq!(response.links[1].tsize, 120);
    }

    #[test]
    fn test_decode_dag_get_without_links() {
        let response: DagGetResponse = serde_json::from_str(r#"{"Data": {}}"#).unwrap();
        assert!(response.links.is_empty());
    }

    #[test]
    fn test_decode_files_stat() {
        let raw = r#"{"Hash":"QmA","Size":0,"CumulativeSize":1234,"Blocks":2,"Type":"directory"}"#;
        let stat: FilesStat = serde_json::from_str(raw).unwrap();
        assert_eq!(stat.kind, "directory");
        assert_eq!(stat.cumulative_size, 1234);
    }
}
