//! Parser for unix-style `LIST` output.
//!
//! A line looks like
//!
//! ```text
//! -rw-r--r-- 1 user group 533 Jan 5 10:00 doggo.jpg
//! ```
//!
//! eight whitespace-separated columns (permissions, link count, owner,
//! group, size, month, day, time-or-year) followed by the entry name, which
//! may itself contain spaces. The entry type is taken from the first
//! character of the permission column. That convention holds for unix-like
//! servers but is not guaranteed by the protocol.

use crate::file_info::{FileInfo, FileType};

const LEADING_COLUMNS: usize = 8;

/// One parsed `LIST` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub permissions: String,
    pub links: String,
    pub owner: String,
    pub group: String,
    pub size: u64,
    pub modified: String,
    pub name: String,
}

impl ListEntry {
    pub fn file_type(&self) -> FileType {
        type_from_permissions(&self.permissions)
    }

    pub fn is_dir(&self) -> bool {
        self.file_type() == FileType::Directory
    }

    /// `.` and `..` entries some servers include.
    pub fn is_navigation(&self) -> bool {
        self.name == "." || self.name == ".."
    }

    pub fn into_file_info(self) -> FileInfo {
        let file_type = self.file_type();
        FileInfo::new(self.name, self.size, file_type)
            .with_owner(self.owner, self.group)
            .with_permissions(self.permissions)
    }
}

pub fn type_from_permissions(permissions: &str) -> FileType {
    if permissions.starts_with('d') {
        FileType::Directory
    } else {
        FileType::File
    }
}

/// Parse a single line. Returns `None` for lines that are not entries,
/// such as the `total 12` header.
pub fn parse_line(line: &str) -> Option<ListEntry> {
    let mut rest = line.trim_end_matches(['\r', '\n']);
    let mut columns = Vec::with_capacity(LEADING_COLUMNS);

    for _ in 0..LEADING_COLUMNS {
        rest = rest.trim_start();
        let end = rest.find(char::is_whitespace)?;
        columns.push(&rest[..end]);
        rest = &rest[end..];
    }

    // Everything after the eighth column is the name.
    let name = rest.trim_start();
    if name.is_empty() {
        return None;
    }

    let permissions = columns[0];
    let name = if permissions.starts_with('l') {
        name.split(" -> ").next().unwrap_or(name)
    } else {
        name
    };

    let size = columns[4].parse::<u64>().ok()?;

    Some(ListEntry {
        permissions: permissions.to_string(),
        links: columns[1].to_string(),
        owner: columns[2].to_string(),
        group: columns[3].to_string(),
        size,
        modified: columns[5..8].join(" "),
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_regular_file() {
        let entry = parse_line("-rw-r--r-- 1 user group 533 Jan 5 10:00 doggo.jpg").unwrap();
        assert_eq!(entry.name, "doggo.jpg");
        assert_eq!(entry.size, 533);
        assert_eq!(entry.file_type(), FileType::File);
        assert_eq!(entry.owner, "user");
        assert_eq!(entry.group, "group");
        assert_eq!(entry.modified, "Jan 5 10:00");

        let info = entry.into_file_info();
        assert_eq!(info.name, "doggo.jpg");
        assert_eq!(info.size, 533);
        assert_eq!(info.extension, "jpg");
        assert_eq!(info.permissions, "-rw-r--r--");
        assert!(info.is_file());
    }

    #[test]
    fn test_parse_directory_with_year() {
        let entry = parse_line("drwxr-xr-x   2 ftp  ftp     4096 Mar 12  2021 backups").unwrap();
        assert!(entry.is_dir());
        assert_eq!(entry.name, "backups");
        assert_eq!(entry.modified, "Mar 12 2021");
    }

    #[test]
    fn test_name_with_spaces() {
        let entry =
            parse_line("-rw-r--r-- 1 user group 10 Jan 5 10:00 quarterly report  final.pdf")
                .unwrap();
        assert_eq!(entry.name, "quarterly report  final.pdf");
    }

    #[test]
    fn test_symlink_target_is_dropped() {
        let entry = parse_line("lrwxrwxrwx 1 root root 7 Jan 5 10:00 latest -> v1.2.3").unwrap();
        assert_eq!(entry.name, "latest");
        assert_eq!(entry.file_type(), FileType::File);
    }

    #[test]
    fn test_trailing_carriage_return() {
        let entry = parse_line("-rw-r--r-- 1 u g 1 Jan 5 10:00 a.txt\r\n").unwrap();
        assert_eq!(entry.name, "a.txt");
    }

    #[test]
    fn test_navigation_entries() {
        assert!(parse_line("drwxr-xr-x 2 u g 0 Jan 5 10:00 ..")
            .unwrap()
            .is_navigation());
        assert!(parse_line("drwxr-xr-x 2 u g 0 Jan 5 10:00 .")
            .unwrap()
            .is_navigation());
    }

    #[test]
    fn test_rejects_non_entries() {
        assert!(parse_line("total 12").is_none());
        assert!(parse_line("").is_none());
        assert!(parse_line("-rw-r--r-- 1 user group notanumber Jan 5 10:00 x").is_none());
        assert!(parse_line("-rw-r--r-- 1 user group 5 Jan 5 10:00").is_none());
    }
}
