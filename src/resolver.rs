//! Default-launcher resolution
//!
//! A default set on a folder applies to every descendant folder unless a more
//! specific descendant has its own record. Resolution is a longest-prefix
//! match over path segments.

use crate::types::{DefaultLauncherRecord, LauncherId};

/// Normalize a folder path to the stored form
///
/// Backslashes become `/`, empty and `.` segments are dropped, a trailing
/// separator is removed, and a leading `/` is kept. Segments are compared
/// case-sensitively, so the casing is left untouched.
///
/// ```
/// use rom_launcher::resolver::normalize_folder_path;
///
/// assert_eq!(normalize_folder_path(r"C:\Games\\SNES\"), "C:/Games/SNES");
/// assert_eq!(normalize_folder_path("/roms/./snes/"), "/roms/snes");
/// assert_eq!(normalize_folder_path("/"), "/");
/// ```
pub fn normalize_folder_path(path: &str) -> String {
    let unified = path.trim().replace('\\', "/");
    let rooted = unified.starts_with('/');
    let joined = segments(&unified).collect::<Vec<_>>().join("/");

    if rooted {
        format!("/{joined}")
    } else {
        joined
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
}

/// Whether `ancestor` is `path` or one of its ancestors, at segment boundaries
fn is_segment_prefix(ancestor: &[&str], path: &[&str]) -> bool {
    ancestor.len() <= path.len() && ancestor.iter().zip(path).all(|(a, p)| a == p)
}

/// Find the launcher configured for `folder_path` or its nearest ancestor
///
/// Both the query and the records are normalized first. Among matching
/// records the one with the most segments wins; equal lengths (only possible
/// with duplicate keys) go to the lexicographically smallest stored path.
///
/// ```
/// use rom_launcher::resolver::resolve_default;
/// use rom_launcher::types::{DefaultLauncherRecord, LauncherId};
///
/// let records = vec![
///     DefaultLauncherRecord { folder_path: "/a".into(), launcher_id: LauncherId(1) },
///     DefaultLauncherRecord { folder_path: "/a/b".into(), launcher_id: LauncherId(2) },
/// ];
/// assert_eq!(resolve_default("/a/b/c", &records), Some(LauncherId(2)));
/// assert_eq!(resolve_default("/x", &records), None);
/// ```
pub fn resolve_default(folder_path: &str, records: &[DefaultLauncherRecord]) -> Option<LauncherId> {
    let query = normalize_folder_path(folder_path);
    let query_segments: Vec<&str> = segments(&query).collect();
    let query_rooted = query.starts_with('/');

    records
        .iter()
        .filter_map(|record| {
            let stored = normalize_folder_path(&record.folder_path);
            if stored.starts_with('/') != query_rooted {
                return None;
            }
            let stored_segments: Vec<&str> = segments(&stored).collect();
            is_segment_prefix(&stored_segments, &query_segments)
                .then(|| (stored_segments.len(), record.folder_path.as_str(), record.launcher_id))
        })
        .max_by(|(len_a, path_a, _), (len_b, path_b, _)| {
            len_a.cmp(len_b).then_with(|| path_b.cmp(path_a))
        })
        .map(|(_, _, id)| id)
}
