//! Display names for the numeric ids found in events.
//!
//! Resolution happens at format time and is allowed to fail: callers decide
//! the placeholder to show in that case.

use nix::unistd::{Gid, Group, Pid, Uid, User};

use crate::parsing::procfs;

/// Lookup service mapping ids to optional display names.
pub trait NameResolver: Send + Sync {
    fn process_name(&self, pid: Pid) -> Option<String>;
    fn user_name(&self, uid: Uid) -> Option<String>;
    fn group_name(&self, gid: Gid) -> Option<String>;
}

/// [`NameResolver`] backed by the running system: the process table and the
/// user and group databases.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNames;

impl NameResolver for SystemNames {
    fn process_name(&self, pid: Pid) -> Option<String> {
        procfs::get_process_comm(pid)
            .map_err(|err| log::trace!("no name for pid {pid}: {err}"))
            .ok()
    }

    fn user_name(&self, uid: Uid) -> Option<String> {
        User::from_uid(uid).ok().flatten().map(|user| user.name)
    }

    fn group_name(&self, gid: Gid) -> Option<String> {
        Group::from_gid(gid).ok().flatten().map(|group| group.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_user_is_known() {
        assert_eq!(
            SystemNames.user_name(Uid::from_raw(0)).as_deref(),
            Some("root")
        );
    }

    #[test]
    fn unused_ids_resolve_to_nothing() {
        assert_eq!(SystemNames.user_name(Uid::from_raw(0x7fff_fff0)), None);
        assert_eq!(SystemNames.group_name(Gid::from_raw(0x7fff_fff0)), None);
    }
}
