//! Social schedule export
//!
//! One row per post, scheduled on consecutive days from the start date.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::types::{EngineError, Result, SocialPost};

#[derive(Debug, Serialize)]
struct ScheduleRow<'a> {
    #[serde(rename = "Platform")]
    platform: &'a str,
    #[serde(rename = "Caption")]
    caption: &'a str,
    #[serde(rename = "Hashtags")]
    hashtags: String,
    #[serde(rename = "Schedule")]
    schedule: String,
}

/// Write `posts` as CSV with header `Platform,Caption,Hashtags,Schedule`
///
/// Returns the number of rows written.
pub fn export_social_schedule(
    posts: &[SocialPost],
    start_date: NaiveDate,
    path: &Path,
) -> Result<usize> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    if posts.is_empty() {
        writer.write_record(["Platform", "Caption", "Hashtags", "Schedule"])?;
    }

    for (day, post) in posts.iter().enumerate() {
        let date = start_date
            .checked_add_days(Days::new(day as u64))
            .ok_or_else(|| EngineError::pipeline("export", "schedule date out of range"))?;
        writer.serialize(ScheduleRow {
            platform: &post.platform,
            caption: &post.caption,
            hashtags: post.hashtags.join(" "),
            schedule: date.format("%Y-%m-%d").to_string(),
        })?;
    }
    writer.flush()?;

    info!(rows = posts.len(), path = %path.display(), "Social schedule exported");
    Ok(posts.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn post(platform: &str, caption: &str) -> SocialPost {
        SocialPost {
            platform: platform.to_string(),
            caption: caption.to_string(),
            hashtags: vec!["#Calyco".to_string(), "#HomeDecor".to_string()],
        }
    }

    #[test]
    fn test_one_post_per_day() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("social/social_schedule.csv");
        let start = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();

        let rows = export_social_schedule(
            &[
                post("Instagram", "Top texture ideas, for 2025"),
                post("LinkedIn", "Low-VOC demand"),
            ],
            start,
            &path,
        )
        .unwrap();

        let csv = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(rows, 2);
        assert_eq!(lines[0], "Platform,Caption,Hashtags,Schedule");
        assert_eq!(
            lines[1],
            "Instagram,\"Top texture ideas, for 2025\",#Calyco #HomeDecor,2025-12-31"
        );
        assert_eq!(lines[2], "LinkedIn,Low-VOC demand,#Calyco #HomeDecor,2026-01-01");
    }

    #[test]
    fn test_empty_schedule_keeps_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schedule.csv");
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        assert_eq!(export_social_schedule(&[], start, &path).unwrap(), 0);
        assert_eq!(
            fs::read_to_string(&path).unwrap().trim(),
            "Platform,Caption,Hashtags,Schedule"
        );
    }
}
