use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::{Stream, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, RequestBuilder, Response};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use url::Url;
use walkdir::WalkDir;

use common::dag::{DagAccessor, DagError, DagLink, NodeKind, NodeStat};
use common::linked_data::{path_join, DataCid};
use common::tree::{Resolution, ResolveOptions, Resolver, TreeNode};

use super::error::IpfsError;
use super::types::{AddEntry, ApiErrorBody, DagGetResponse, FilesStat};

const DIRECTORY_MIME: &str = "application/x-directory";
const READ_CHUNK: usize = 64 * 1024;
const ADD_QUERY: [(&str, &str); 3] = [
    ("pin", "true"),
    ("wrap-with-directory", "false"),
    ("cid-version", "0"),
];

#[derive(Debug, Clone)]
pub struct IpfsClient {
    pub remote: Url,
    client: Client,
}

impl IpfsClient {
    pub fn new(remote: &Url) -> Result<Self, IpfsError> {
        let client = Client::builder().build()?;

        Ok(Self {
            remote: remote.clone(),
            client,
        })
    }

    fn endpoint(&self, command: &str) -> Result<Url, IpfsError> {
        Ok(Url::parse(&path_join(
            self.remote.as_str(),
            &["api/v0", command],
        ))?)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, IpfsError> {
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await?;
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|err| err.message)
            .unwrap_or(body);
        Err(IpfsError::Api(status, message))
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        command: &str,
        args: &[&str],
    ) -> Result<T, IpfsError> {
        let query: Vec<(&str, &str)> = args.iter().map(|arg| ("arg", *arg)).collect();
        let request = self.client.post(self.endpoint(command)?).query(&query);
        let body = self.send(request).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Stat an identifier through the node's `/ipfs` namespace
    pub async fn files_stat(&self, cid: &DataCid) -> Result<FilesStat, IpfsError> {
        self.post_json("files/stat", &[&cid.ipfs_path()]).await
    }

    /// Fetch the dag-pb node behind `cid`
    pub async fn dag_get(&self, cid: &DataCid) -> Result<DagGetResponse, IpfsError> {
        self.post_json("dag/get", &[cid.as_str()]).await
    }

    /// Copy `cid` into the node's mutable filesystem at `/<name>`,
    ///  so it shows up in the node's own file listing.
    pub async fn files_cp(&self, cid: &DataCid, name: &str) -> Result<(), IpfsError> {
        let source = cid.ipfs_path();
        let dest = path_join("/", &[name]);
        let request = self
            .client
            .post(self.endpoint("files/cp")?)
            .query(&[("arg", source.as_str()), ("arg", dest.as_str())]);

        match self.send(request).await {
            Ok(_) => Ok(()),
            Err(IpfsError::Api(_, message)) if message.contains("already has entry") => {
                tracing::debug!(%cid, %dest, "already present in mfs");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Add a single file, pinned
    pub async fn add_file(&self, path: &Path) -> Result<DataCid, IpfsError> {
        let name = file_name(path);
        let part = file_part(path, &name).await?;
        let form = Form::new().part("file", part);

        let entries = self.add(form).await?;
        let entry = entries.last().ok_or(IpfsError::EmptyAdd)?;
        let cid = parse_cid(&entry.hash)?;

        self.files_cp(&cid, &name).await?;
        Ok(cid)
    }

    /// Add a directory and everything beneath it, pinned.
    ///
    /// Returns the identifier of the directory itself.
    pub async fn add_dir(&self, path: &Path) -> Result<DataCid, IpfsError> {
        let name = file_name(path);
        let mut form = Form::new();

        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(|source| IpfsError::Walk {
                path: path.display().to_string(),
                source,
            })?;
            let relative = entry.path().strip_prefix(path).unwrap_or(entry.path());
            // reqwest percent-encodes the slashes, which is what the node expects
            let part_name = Path::new(&name)
                .join(relative)
                .to_string_lossy()
                .trim_end_matches('/')
                .to_string();

            let part = if entry.file_type().is_dir() {
                Part::bytes(Vec::new())
                    .file_name(part_name)
                    .mime_str(DIRECTORY_MIME)?
            } else {
                file_part(entry.path(), &part_name).await?
            };
            form = form.part("file", part);
        }

        let entries = self.add(form).await?;
        let root = entries
            .iter()
            .rev()
            .find(|entry| entry.name == name)
            .or_else(|| entries.last())
            .ok_or(IpfsError::EmptyAdd)?;
        let cid = parse_cid(&root.hash)?;

        self.files_cp(&cid, &name).await?;
        Ok(cid)
    }

    async fn add(&self, form: Form) -> Result<Vec<AddEntry>, IpfsError> {
        let request = self
            .client
            .post(self.endpoint("add")?)
            .query(&ADD_QUERY)
            .multipart(form);
        let body = self.send(request).await?.text().await?;

        body.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str::<AddEntry>(line).map_err(IpfsError::from))
            .collect()
    }

    /// Stream the content of a file identifier to `dest`.
    ///
    /// Returns the number of bytes written.
    pub async fn cat_to(&self, cid: &DataCid, dest: &Path) -> Result<u64, IpfsError> {
        let request = self
            .client
            .post(self.endpoint("cat")?)
            .query(&[("arg", cid.as_str())]);
        let response = self.send(request).await?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }

    /// Download `cid` to `out_path`.
    ///
    /// Directories are resolved into a tree first and recreated entry by
    ///  entry under their link names. Entries the walk could not resolve
    ///  are left out; the tree's issues say which.
    pub async fn get(
        &self,
        cid: &DataCid,
        out_path: &Path,
        options: ResolveOptions,
    ) -> Result<Resolution, IpfsError> {
        let mut resolver = Resolver::new(self).with_options(options);
        let resolution = resolver.resolve(cid).await?;
        for issue in &resolution.issues {
            tracing::warn!(cid = %issue.cid, kind = ?issue.kind, "{}", issue.message);
        }

        self.materialize(&resolution.root, out_path.to_path_buf())
            .await?;
        Ok(resolution)
    }

    fn materialize<'a>(
        &'a self,
        node: &'a TreeNode,
        dest: PathBuf,
    ) -> BoxFuture<'a, Result<(), IpfsError>> {
        Box::pin(async move {
            if !node.is_dir() {
                let written = self.cat_to(node.hash(), &dest).await?;
                tracing::debug!(cid = %node.hash(), dest = %dest.display(), written, "wrote file");
                return Ok(());
            }

            tokio::fs::create_dir_all(&dest).await?;
            for child in node.children() {
                let name = safe_name(child.name())?;
                self.materialize(child, dest.join(name)).await?;
            }
            Ok(())
        })
    }
}

#[async_trait]
impl DagAccessor for IpfsClient {
    async fn stat(&self, cid: &DataCid) -> Result<NodeStat, DagError> {
        let stat = self.files_stat(cid).await.map_err(into_dag_error)?;
        Ok(NodeStat {
            kind: NodeKind::from_type_str(&stat.kind),
            cumulative_size: stat.cumulative_size,
        })
    }

    async fn links(&self, cid: &DataCid) -> Result<Vec<DagLink>, DagError> {
        let node = self.dag_get(cid).await.map_err(into_dag_error)?;
        node.links
            .into_iter()
            .map(|link| {
                let target = DataCid::parse(&link.hash.target)
                    .map_err(|err| DagError::Malformed(err.to_string()))?;
                Ok(DagLink {
                    target,
                    name: link.name,
                    size: link.tsize,
                })
            })
            .collect()
    }
}

fn into_dag_error(err: IpfsError) -> DagError {
    match err {
        IpfsError::Decode(err) => DagError::Malformed(err.to_string()),
        IpfsError::Reqwest(err) if err.is_timeout() => DagError::Timeout,
        other => DagError::Unavailable(other.to_string()),
    }
}

fn parse_cid(hash: &str) -> Result<DataCid, IpfsError> {
    Ok(DataCid::parse(hash)?)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string())
}

/// A multipart entry for the file at `path`.
///
/// The file is only opened once the request body reaches this part, so
///  a directory upload holds at most one descriptor at a time.
async fn file_part(path: &Path, part_name: &str) -> Result<Part, IpfsError> {
    let length = tokio::fs::metadata(path).await?.len();
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let body = Body::wrap_stream(lazy_file_stream(path.to_path_buf()));
    Ok(Part::stream_with_length(body, length)
        .file_name(part_name.to_string())
        .mime_str(mime.as_ref())?)
}

/// Chunks of the file at `path`, opening it on first poll and closing
///  it as soon as it is exhausted.
fn lazy_file_stream(
    path: PathBuf,
) -> impl Stream<Item = Result<Vec<u8>, std::io::Error>> + Send + 'static {
    futures::stream::try_unfold((path, None), |(path, file)| next_chunk(path, file))
}

type ChunkState = (PathBuf, Option<tokio::fs::File>);

async fn next_chunk(
    path: PathBuf,
    file: Option<tokio::fs::File>,
) -> Result<Option<(Vec<u8>, ChunkState)>, std::io::Error> {
    let mut file = match file {
        Some(file) => file,
        None => tokio::fs::File::open(&path).await?,
    };
    let mut chunk = vec![0u8; READ_CHUNK];
    let read = file.read(&mut chunk).await?;
    if read == 0 {
        return Ok(None);
    }
    chunk.truncate(read);
    Ok(Some((chunk, (path, Some(file)))))
}

/// Link names come from the network; never let one climb out of
///  the output directory.
pub(crate) fn safe_name(name: &str) -> Result<&str, IpfsError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(IpfsError::UnsafeName(name.to_string()));
    }
    Ok(name)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = IpfsClient::new(&Url::parse("http://127.0.0.1:5001").unwrap()).unwrap();
        assert_eq!(
            client.endpoint("files/stat").unwrap().as_str(),
            "http://127.0.0.1:5001/api/v0/files/stat"
        );

        let proxied = IpfsClient::new(&Url::parse("https://node.example.com/ipfs-rpc/").unwrap())
            .unwrap();
        assert_eq!(
            proxied.endpoint("dag/get").unwrap().as_str(),
            "https://node.example.com/ipfs-rpc/api/v0/dag/get"
        );
    }

    #[test]
    fn test_safe_name() {
        assert_eq!(safe_name("photo.jpg").unwrap(), "photo.jpg");
        for bad in ["", ".", "..", "a/b", "..\\x", "nul\0"] {
            assert!(matches!(safe_name(bad), Err(IpfsError::UnsafeName(_))));
        }
    }

    #[test]
    fn test_decode_errors_map_to_malformed() {
        let err = serde_json::from_str::<FilesStat>("{}").unwrap_err();
        assert!(matches!(
            into_dag_error(IpfsError::Decode(err)),
            DagError::Malformed(_)
        ));
        assert!(matches!(
            into_dag_error(IpfsError::EmptyAdd),
            DagError::Unavailable(_)
        ));
    }

    #[tokio::test]
    async fn test_file_stream_opens_on_first_poll() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("late.bin");

        // building the stream must not touch the file
        let stream = lazy_file_stream(path.clone());
        let content: Vec<u8> = (0..READ_CHUNK * 2 + 17).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &content).unwrap();

        let chunks: Vec<Vec<u8>> = stream
            .map(|chunk| chunk.unwrap())
            .collect::<Vec<_>>()
            .await;
        assert!(chunks.iter().all(|chunk| chunk.len() <= READ_CHUNK));
        assert_eq!(chunks.concat(), content);
    }

    #[tokio::test]
    async fn test_file_stream_reports_missing_file_when_polled() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("gone.bin");
        std::fs::write(&path, b"abc").unwrap();

        let mut stream = Box::pin(lazy_file_stream(path.clone()));
        std::fs::remove_file(&path).unwrap();

        let err = stream.next().await.unwrap().unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_many_parts_hold_no_descriptors() {
        let temp = tempfile::tempdir().unwrap();
        let mut form = Form::new();
        // more entries than a default descriptor limit
        for i in 0..2048 {
            let path = temp.path().join(format!("f{}", i));
            std::fs::write(&path, b"x").unwrap();
            form = form.part("file", file_part(&path, &format!("dir/f{}", i)).await.unwrap());
        }
        assert!(!form.boundary().is_empty());
    }

    #[test]
    fn test_add_never_wraps() {
        assert!(ADD_QUERY.contains(&("pin", "true")));
        assert!(ADD_QUERY.contains(&("wrap-with-directory", "false")));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(Path::new("/tmp/report.pdf")), "report.pdf");
        assert_eq!(file_name(Path::new("/")), "upload");
    }
}
