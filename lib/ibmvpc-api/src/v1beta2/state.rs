//! Lifecycle states reported by IBM Cloud for instances, images and load balancers

use crate::string_enum::string_enum;

string_enum! {
    /// State of an IBM Power VS instance
    pub enum PowerVSInstanceState {
        Active => "ACTIVE",
        Build => "BUILD",
        Shutoff => "SHUTOFF",
        Reboot => "REBOOT",
        Error => "ERROR",
    }
}

impl PowerVSInstanceState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Error)
    }
}

string_enum! {
    /// State of an IBM Power VS image
    pub enum PowerVSImageState {
        Active => "active",
        Queued => "queued",
        Failed => "failed",
        Importing => "importing",
    }
}

impl PowerVSImageState {
    /// An image can back new instances only once it is active
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

string_enum! {
    /// Provisioning state of a VPC load balancer.
    ///
    /// The cloud reports more states than listed here (update_pending,
    /// failed, maintenance_pending); those decode as `Unknown` and are
    /// treated as neither active nor pending.
    pub enum VPCLoadBalancerState {
        Active => "active",
        CreatePending => "create_pending",
        DeletePending => "delete_pending",
    }
}

impl VPCLoadBalancerState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// A create or delete is still in flight
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::CreatePending | Self::DeletePending)
    }
}

string_enum! {
    /// Policy used to identify images to be preserved
    pub enum DeletePolicy {
        Retain => "retain",
    }
}
