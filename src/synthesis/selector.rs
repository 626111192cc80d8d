use crate::models::{DeploymentPattern, Role, Vlan, VlanPurpose, VlanSet};

/// Whether a switch in `role` carries a VLAN of the given purpose under `pattern`.
///
/// Purpose-less, parking and BMC VLANs are infrastructure and ride on every
/// switch. The BMC switch carries nothing else.
pub fn carries(pattern: DeploymentPattern, role: Role, purpose: Option<VlanPurpose>) -> bool {
    use DeploymentPattern::*;
    use VlanPurpose::*;

    let Some(purpose) = purpose else {
        return true;
    };
    match (role, purpose) {
        (_, Parking | Bmc) => true,
        (Role::Bmc, _) => false,
        (_, Management | Compute) => true,
        (_, Storage1 | Storage2) => match pattern {
            Switchless => false,
            FullyConverged => true,
            Switched => matches!(
                (role, purpose),
                (Role::Tor1, Storage1) | (Role::Tor2, Storage2)
            ),
        },
    }
}

/// The subset of `vlans` a switch in `role` carries, in input order.
pub fn select_vlans(pattern: DeploymentPattern, role: Role, vlans: &[Vlan]) -> Vec<Vlan> {
    vlans
        .iter()
        .filter(|v| carries(pattern, role, v.purpose))
        .cloned()
        .collect()
}

/// Tagged set for host-facing trunks that leave theirs empty: every carried
/// management, compute and storage VLAN.
pub fn host_trunk_default(pattern: DeploymentPattern, role: Role, vlans: &[Vlan]) -> VlanSet {
    vlans
        .iter()
        .filter(|v| {
            matches!(
                v.purpose,
                Some(VlanPurpose::Management | VlanPurpose::Compute | VlanPurpose::Storage1 | VlanPurpose::Storage2)
            )
        })
        .filter(|v| carries(pattern, role, v.purpose))
        .map(|v| v.vlan_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vlan(id: u16, purpose: Option<VlanPurpose>) -> Vlan {
        Vlan {
            vlan_id: id,
            name: format!("VLAN{}", id),
            purpose,
            shutdown: false,
            interface: None,
        }
    }

    fn rack_vlans() -> Vec<Vlan> {
        vec![
            vlan(2, Some(VlanPurpose::Parking)),
            vlan(7, Some(VlanPurpose::Management)),
            vlan(125, Some(VlanPurpose::Bmc)),
            vlan(201, Some(VlanPurpose::Compute)),
            vlan(711, Some(VlanPurpose::Storage1)),
            vlan(712, Some(VlanPurpose::Storage2)),
            vlan(99, None),
        ]
    }

    fn ids(vlans: &[Vlan]) -> Vec<u16> {
        vlans.iter().map(|v| v.vlan_id).collect()
    }

    #[test]
    fn test_switched_splits_storage_between_tors() {
        let vlans = rack_vlans();
        let tor1 = select_vlans(DeploymentPattern::Switched, Role::Tor1, &vlans);
        let tor2 = select_vlans(DeploymentPattern::Switched, Role::Tor2, &vlans);
        assert!(tor1.iter().all(|v| !v.has_purpose(VlanPurpose::Storage2)));
        assert!(tor2.iter().all(|v| !v.has_purpose(VlanPurpose::Storage1)));
        assert!(tor1.iter().any(|v| v.vlan_id == 711));
        assert!(tor2.iter().any(|v| v.vlan_id == 712));
    }

    #[test]
    fn test_switched_exclusivity_for_every_purpose_mix() {
        let purposes = [
            None,
            Some(VlanPurpose::Management),
            Some(VlanPurpose::Compute),
            Some(VlanPurpose::Storage1),
            Some(VlanPurpose::Storage2),
            Some(VlanPurpose::Parking),
            Some(VlanPurpose::Bmc),
        ];
        for (i, a) in purposes.iter().enumerate() {
            for b in &purposes[i..] {
                let vlans = vec![vlan(10, *a), vlan(20, *b)];
                let tor1 = select_vlans(DeploymentPattern::Switched, Role::Tor1, &vlans);
                let tor2 = select_vlans(DeploymentPattern::Switched, Role::Tor2, &vlans);
                assert!(!tor1.iter().any(|v| v.has_purpose(VlanPurpose::Storage2)));
                assert!(!tor2.iter().any(|v| v.has_purpose(VlanPurpose::Storage1)));
            }
        }
    }

    #[test]
    fn test_switchless_has_no_storage() {
        let tor1 = select_vlans(DeploymentPattern::Switchless, Role::Tor1, &rack_vlans());
        assert_eq!(ids(&tor1), vec![2, 7, 125, 201, 99]);
    }

    #[test]
    fn test_fully_converged_carries_both_storage_on_both() {
        for role in Role::TOR_PAIR {
            let selected = select_vlans(DeploymentPattern::FullyConverged, role, &rack_vlans());
            assert_eq!(selected.len(), 7);
        }
    }

    #[test]
    fn test_bmc_keeps_infrastructure_only() {
        let bmc = select_vlans(DeploymentPattern::FullyConverged, Role::Bmc, &rack_vlans());
        assert_eq!(ids(&bmc), vec![2, 125, 99]);
    }

    #[test]
    fn test_host_trunk_default() {
        let set = host_trunk_default(DeploymentPattern::Switched, Role::Tor2, &rack_vlans());
        assert_eq!(set.to_string(), "7,201,712");
        let set = host_trunk_default(DeploymentPattern::Switchless, Role::Tor1, &rack_vlans());
        assert_eq!(set.to_string(), "7,201");
    }
}
