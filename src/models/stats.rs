use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::video::VideoRecord;

/// Summary counts derived from a catalog snapshot. `storage_used` is a
/// display estimate in MB summed from each record's size label, not a disk
/// measurement.
#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_videos: usize,
    pub total_views: u64,
    pub categories: BTreeMap<String, usize>,
    pub storage_used: f64,
}

impl CatalogStats {
    pub fn compute(videos: &[VideoRecord]) -> Self {
        let mut stats = CatalogStats {
            total_videos: videos.len(),
            ..CatalogStats::default()
        };
        for video in videos {
            stats.total_views += video.views;
            *stats
                .categories
                .entry(video.category.label().to_string())
                .or_insert(0) += 1;
            stats.storage_used += size_label_as_mb(&video.size_label);
        }
        stats
    }
}

// Labels carry one of Bytes/KB/MB/GB; only GB needs scaling to keep the sum
// MB-based, everything else contributes its bare numeric value.
fn size_label_as_mb(label: &str) -> f64 {
    let digits: String = label
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let value: f64 = digits.parse().unwrap_or(0.0);
    if label.contains("GB") {
        value * 1024.0
    } else {
        value
    }
}
