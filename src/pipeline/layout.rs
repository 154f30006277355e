//! Output tree layout
//!
//! Every path the pipeline reads or writes is derived here from one root.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{ContentKind, Result};

#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create every directory the pipeline writes into
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [
            self.raw_dir(),
            self.web_copy_dir(),
            self.blogs_dir(),
            self.social_dir(),
            self.ads_dir(),
            self.images_dir(),
            self.qc_dir(),
            self.jsonld_dir(ContentKind::Web),
            self.jsonld_dir(ContentKind::Blog),
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    // =========================================================================
    // Directories
    // =========================================================================

    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("raw")
    }

    pub fn web_copy_dir(&self) -> PathBuf {
        self.root.join("web_copy")
    }

    pub fn blogs_dir(&self) -> PathBuf {
        self.root.join("blogs")
    }

    pub fn social_dir(&self) -> PathBuf {
        self.root.join("social")
    }

    pub fn ads_dir(&self) -> PathBuf {
        self.root.join("ads")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    pub fn qc_dir(&self) -> PathBuf {
        self.root.join("qc")
    }

    /// `blogs/jsonld` or `web_copy/jsonld`
    pub fn jsonld_dir(&self, kind: ContentKind) -> PathBuf {
        match kind {
            ContentKind::Blog => self.blogs_dir().join("jsonld"),
            ContentKind::Web => self.web_copy_dir().join("jsonld"),
        }
    }

    // =========================================================================
    // Files
    // =========================================================================

    pub fn trends_file(&self) -> PathBuf {
        self.raw_dir().join("google_trends.json")
    }

    pub fn news_file(&self) -> PathBuf {
        self.raw_dir().join("news.json")
    }

    pub fn competitors_file(&self) -> PathBuf {
        self.raw_dir().join("competitors.json")
    }

    pub fn social_snapshot_file(&self, profile: &str) -> PathBuf {
        self.raw_dir().join(format!("{}_social.json", profile))
    }

    pub fn web_copy_file(&self, slug: &str) -> PathBuf {
        self.web_copy_dir().join(format!("{}.json", slug))
    }

    pub fn blog_file(&self, slug: &str) -> PathBuf {
        self.blogs_dir().join(format!("{}.md", slug))
    }

    pub fn social_posts_file(&self) -> PathBuf {
        self.social_dir().join("social_posts.json")
    }

    pub fn schedule_file(&self) -> PathBuf {
        self.social_dir().join("social_schedule.csv")
    }

    pub fn ads_file(&self) -> PathBuf {
        self.ads_dir().join("ad_snippets.json")
    }

    pub fn qc_file(&self, kind: ContentKind) -> PathBuf {
        match kind {
            ContentKind::Blog => self.qc_dir().join("blog_qc.json"),
            ContentKind::Web => self.qc_dir().join("web_copy_qc.json"),
        }
    }

    pub fn jsonld_file(&self, kind: ContentKind, slug: &str) -> PathBuf {
        self.jsonld_dir(kind).join(format!("{}.json", slug))
    }

    pub fn sitemap_file(&self) -> PathBuf {
        self.root.join("sitemap.xml")
    }

    pub fn dashboard_file(&self) -> PathBuf {
        self.root.join("dashboard.html")
    }

    pub fn run_report_file(&self) -> PathBuf {
        self.root.join("run_report.json")
    }

    /// `path` relative to the root with forward slashes, for dashboard links
    pub fn relative(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Pretty-print `value` to `path`, creating parent directories
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Files directly under `dir` with one of `extensions`, sorted by path
///
/// A missing directory yields an empty list.
pub fn list_files(dir: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let base = glob::Pattern::escape(&dir.to_string_lossy());
    let mut files: Vec<PathBuf> = extensions
        .iter()
        .filter_map(|ext| glob::glob(&format!("{}/*.{}", base, ext)).ok())
        .flat_map(|paths| paths.filter_map(|p| p.ok()))
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    files.dedup();
    files
}

/// Like [`read_json`] but a missing file yields `None`
pub fn read_json_opt<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    read_json(path).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_follow_layout() {
        let layout = OutputLayout::new("outputs");
        assert_eq!(layout.trends_file(), Path::new("outputs/raw/google_trends.json"));
        assert_eq!(
            layout.social_snapshot_file("asianpaints"),
            Path::new("outputs/raw/asianpaints_social.json")
        );
        assert_eq!(
            layout.jsonld_file(ContentKind::Blog, "colors"),
            Path::new("outputs/blogs/jsonld/colors.json")
        );
        assert_eq!(layout.qc_file(ContentKind::Web), Path::new("outputs/qc/web_copy_qc.json"));
    }

    #[test]
    fn test_relative_links() {
        let layout = OutputLayout::new("/tmp/out");
        assert_eq!(
            layout.relative(Path::new("/tmp/out/images/hero.png")),
            "images/hero.png"
        );
    }

    #[test]
    fn test_json_helpers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/value.json");
        write_json(&path, &vec!["a", "b"]).unwrap();

        let back: Vec<String> = read_json(&path).unwrap();
        assert_eq!(back, vec!["a", "b"]);

        let missing: Option<Vec<String>> = read_json_opt(&dir.path().join("nope.json")).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_list_files_filters_by_extension() {
        let dir = TempDir::new().unwrap();
        for name in ["b.md", "a.md", "c.json", "d.txt"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::create_dir(dir.path().join("jsonld.md")).unwrap();

        let files = list_files(dir.path(), &["md", "json"]);
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.md", "b.md", "c.json"]);
        assert!(list_files(&dir.path().join("missing"), &["md"]).is_empty());
    }

    #[test]
    fn test_ensure_dirs() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path().join("outputs"));
        layout.ensure_dirs().unwrap();
        assert!(layout.images_dir().is_dir());
        assert!(layout.jsonld_dir(ContentKind::Web).is_dir());
    }
}
