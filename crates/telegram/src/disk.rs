//! Free space of the filesystem holding the download directory

use std::path::Path;

use sysinfo::Disks;

/// Bytes available on the disk `path` lives on.
///
/// Blocks while the mount list is read; call it from a blocking task.
pub fn available_space(path: &Path) -> Option<u64> {
    let target = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let disks = Disks::new_with_refreshed_list();

    let mounts = disks
        .list()
        .iter()
        .map(|disk| (disk.mount_point(), disk.available_space()));
    longest_mount_match(&target, mounts)
        .or_else(|| disks.list().first().map(|disk| disk.available_space()))
}

/// Available bytes of the most specific mount point containing `target`
fn longest_mount_match<'a, I>(target: &Path, mounts: I) -> Option<u64>
where
    I: IntoIterator<Item = (&'a Path, u64)>,
{
    mounts
        .into_iter()
        .filter(|(mount, _)| target.starts_with(mount))
        .max_by_key(|(mount, _)| mount.as_os_str().len())
        .map(|(_, available)| available)
}
