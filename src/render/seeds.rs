//! Default template set compiled into the binary.
//!
//! Control tags sit on their own line as `{%- ... %}` so they leave no
//! blank lines behind.

/// (template key, tera source)
pub const BUNDLED: &[(&str, &str)] = &[
    ("dellemc/os10/full_config", DELLEMC_OS10),
    ("cisco/nxos/full_config", CISCO_NXOS),
];

const DELLEMC_OS10: &str = r#"! {{ switch.hostname }} | {{ switch.vendor }} {{ switch.model }} | {{ switch.role }} | {{ switch.deployment_pattern }}
!
hostname {{ switch.hostname }}
!
{%- if has_qos_interfaces %}
class-map type network-qos AZS_SERVICES_nqos
 match qos-group 3
!
policy-map type network-qos AZS_SERVICES_pfc
 class AZS_SERVICES_nqos
  pause
  pfc-cos 3
!
system qos
 trust-map dot1p default
 service-policy input type network-qos AZS_SERVICES_pfc
!
{%- endif %}
{%- if _computed is defined %}
spanning-tree mode mst
spanning-tree mst configuration
 name {{ switch.hostname }}
 revision 1
 instance 1 vlan {{ vlan_ids_string }}
!
spanning-tree mst 0-1 priority {{ _computed.mst_priority }}
!
{%- endif %}
{%- for vlan in vlans %}
interface vlan{{ vlan.vlan_id }}
 description {{ vlan.name }}
{%- if vlan.interface is defined %}
{%- if vlan.interface.mtu is defined %}
 mtu {{ vlan.interface.mtu }}
{%- endif %}
{%- if vlan.interface.ip is defined %}
 ip address {{ vlan.interface.ip }}/{{ vlan.interface.cidr }}
{%- endif %}
{%- if vlan.interface.redundancy is defined %}
 vrrp-group {{ vlan.interface.redundancy.group }}
  priority {{ vlan.interface.redundancy.priority }}
  virtual-address {{ vlan.interface.redundancy.virtual_ip }}
{%- endif %}
{%- endif %}
{%- if vlan.shutdown is defined and vlan.shutdown %}
 shutdown
{%- else %}
 no shutdown
{%- endif %}
!
{%- endfor %}
{%- for intf in interfaces %}
{%- if intf.intf_type == "loopback" %}
interface {{ intf.intf }}
 description {{ intf.name }}
{%- if intf.ipv4 is defined %}
 ip address {{ intf.ipv4 }}
{%- endif %}
{%- else %}
{%- if intf.intf is defined %}
interface ethernet{{ intf.intf }}
{%- else %}
interface range ethernet{{ intf.start_intf | parse_interface_range(end=intf.end_intf) }}
{%- endif %}
 description {{ intf.name }}
{%- if intf.type == "L3" %}
 no switchport
{%- if intf.ipv4 is defined %}
 ip address {{ intf.ipv4 }}
{%- endif %}
{%- elif intf.type == "Access" %}
{%- if intf.access_vlan is defined %}
 switchport access vlan {{ intf.access_vlan }}
{%- endif %}
{%- else %}
 switchport mode trunk
{%- if intf.native_vlan is defined %}
 switchport access vlan {{ intf.native_vlan }}
{%- endif %}
{%- if intf.tagged_vlans is defined %}
 switchport trunk allowed vlan {{ intf.tagged_vlans }}
{%- endif %}
{%- endif %}
 mtu 9216
{%- if intf.qos is defined and intf.qos %}
 priority-flow-control mode on
 service-policy input type network-qos AZS_SERVICES_pfc
{%- endif %}
 no shutdown
{%- endif %}
!
{%- endfor %}
{%- for pc in port_channels %}
interface port-channel{{ pc.id }}
 description {{ pc.description }}
{%- if pc.type == "L3" %}
 no switchport
{%- if pc.ipv4 is defined %}
 ip address {{ pc.ipv4 }}
{%- endif %}
{%- else %}
 switchport mode trunk
{%- if pc.native_vlan is defined %}
 switchport access vlan {{ pc.native_vlan }}
{%- endif %}
{%- if pc.tagged_vlans is defined %}
 switchport trunk allowed vlan {{ pc.tagged_vlans }}
{%- endif %}
{%- endif %}
 no shutdown
!
{%- for member in pc.members %}
interface ethernet{{ member }}
 channel-group {{ pc.id }} mode active
 no shutdown
!
{%- endfor %}
{%- endfor %}
{%- if has_mlag %}
vlt-domain {{ mlag.domain_id }}
 backup destination {{ mlag.peer_keepalive.destination_ip }}{% if mlag.peer_keepalive.vrf is defined %} vrf {{ mlag.peer_keepalive.vrf }}{% endif %}
{%- if peer_link %}
 discovery-interface ethernet{{ peer_link.members | join(sep=",ethernet") }}
{%- endif %}
{%- if mlag.peer_gateway %}
 peer-routing
{%- endif %}
{%- if mlag.role_priority is defined %}
 primary-priority {{ mlag.role_priority }}
{%- endif %}
{%- if mlag.delay_restore is defined %}
 delay-restore {{ mlag.delay_restore }}
{%- endif %}
!
{%- endif %}
{%- if has_prefix_lists %}
{%- for name, entries in prefix_lists %}
{%- for entry in entries %}
ip prefix-list {{ name }} seq {{ entry.seq }} {{ entry.action }} {{ entry.prefix }}{% if entry.ge is defined %} ge {{ entry.ge }}{% endif %}{% if entry.le is defined %} le {{ entry.le }}{% endif %}
{%- endfor %}
{%- endfor %}
!
{%- endif %}
{%- if has_bgp %}
router bgp {{ bgp.asn }}
 router-id {{ bgp.router_id }}
 bestpath as-path multipath-relax
 maximum-paths ebgp 8
 !
 address-family ipv4 unicast
{%- for network in bgp.networks %}
  network {{ network }}
{%- endfor %}
 !
{%- for n in bgp.neighbors %}
 neighbor {{ n.ip }}
  description {{ n.description }}
  remote-as {{ n.remote_as }}
{%- if n.update_source is defined %}
  update-source {{ n.update_source }}
{%- endif %}
{%- if n.ebgp_multihop is defined %}
  ebgp-multihop {{ n.ebgp_multihop }}
{%- endif %}
  no shutdown
  address-family ipv4 unicast
{%- if n.af_ipv4_unicast is defined %}
{%- if n.af_ipv4_unicast.prefix_list_in is defined %}
   prefix-list {{ n.af_ipv4_unicast.prefix_list_in }} in
{%- endif %}
{%- if n.af_ipv4_unicast.prefix_list_out is defined %}
   prefix-list {{ n.af_ipv4_unicast.prefix_list_out }} out
{%- endif %}
{%- endif %}
  !
{%- endfor %}
!
{%- endif %}
{%- if has_static_routes %}
{%- for route in static_routes %}
ip route {{ route.prefix }} {{ route.next_hop }}
{%- endfor %}
!
{%- endif %}
end
"#;

const CISCO_NXOS: &str = r#"! {{ switch.hostname }} | {{ switch.vendor }} {{ switch.model }} | {{ switch.role }} | {{ switch.deployment_pattern }}
!
hostname {{ switch.hostname }}
!
feature interface-vlan
feature lacp
feature lldp
{%- if has_bgp %}
feature bgp
{%- endif %}
{%- if has_mlag %}
feature vpc
{%- endif %}
{%- if has_svis %}
feature hsrp
{%- endif %}
!
{%- if has_qos_interfaces %}
policy-map type network-qos AZS_SERVICES
 class type network-qos c-8q-nq3
  pause pfc-cos 3
  mtu 9216
!
system qos
 service-policy type network-qos AZS_SERVICES
!
{%- endif %}
{%- if _computed is defined %}
spanning-tree mode mst
spanning-tree mst 0-1 priority {{ _computed.mst_priority }}
spanning-tree mst configuration
 name {{ switch.hostname }}
 revision 1
 instance 1 vlan {{ vlan_ids_string }}
!
{%- endif %}
{%- for vlan in vlans %}
vlan {{ vlan.vlan_id }}
 name {{ vlan.name }}
{%- if vlan.shutdown is defined and vlan.shutdown %}
 shutdown
{%- endif %}
{%- endfor %}
!
{%- for vlan in vlans %}
{%- if vlan.interface is defined %}
interface Vlan{{ vlan.vlan_id }}
 description {{ vlan.name }}
{%- if vlan.interface.mtu is defined %}
 mtu {{ vlan.interface.mtu }}
{%- endif %}
 no ip redirects
{%- if vlan.interface.ip is defined %}
 ip address {{ vlan.interface.ip }}/{{ vlan.interface.cidr }}
{%- endif %}
{%- if vlan.interface.redundancy is defined %}
 hsrp version 2
 hsrp {{ vlan.interface.redundancy.group }}
  priority {{ vlan.interface.redundancy.priority }}
  preempt
  ip {{ vlan.interface.redundancy.virtual_ip }}
{%- endif %}
 no shutdown
!
{%- endif %}
{%- endfor %}
{%- for intf in interfaces %}
{%- if intf.intf_type == "loopback" %}
interface {{ intf.intf }}
 description {{ intf.name }}
{%- if intf.ipv4 is defined %}
 ip address {{ intf.ipv4 }}
{%- endif %}
{%- else %}
{%- if intf.intf is defined %}
interface Ethernet{{ intf.intf }}
{%- else %}
interface Ethernet{{ intf.start_intf | parse_interface_range(end=intf.end_intf) }}
{%- endif %}
 description {{ intf.name }}
{%- if intf.type == "L3" %}
 no switchport
{%- if intf.ipv4 is defined %}
 ip address {{ intf.ipv4 }}
{%- endif %}
{%- elif intf.type == "Access" %}
 switchport
{%- if intf.access_vlan is defined %}
 switchport access vlan {{ intf.access_vlan }}
{%- endif %}
 spanning-tree port type edge
{%- else %}
 switchport
 switchport mode trunk
{%- if intf.native_vlan is defined %}
 switchport trunk native vlan {{ intf.native_vlan }}
{%- endif %}
{%- if intf.tagged_vlans is defined %}
 switchport trunk allowed vlan {{ intf.tagged_vlans }}
{%- endif %}
{%- endif %}
 mtu 9216
{%- if intf.qos is defined and intf.qos %}
 priority-flow-control mode on
{%- endif %}
 no shutdown
{%- endif %}
!
{%- endfor %}
{%- if has_mlag %}
vpc domain {{ mlag.domain_id }}
{%- if mlag.role_priority is defined %}
 role priority {{ mlag.role_priority }}
{%- endif %}
 peer-keepalive destination {{ mlag.peer_keepalive.destination_ip }} source {{ mlag.peer_keepalive.source_ip }}{% if mlag.peer_keepalive.vrf is defined %} vrf {{ mlag.peer_keepalive.vrf }}{% endif %}
{%- if mlag.delay_restore is defined %}
 delay restore {{ mlag.delay_restore }}
{%- endif %}
{%- if mlag.peer_gateway %}
 peer-gateway
{%- endif %}
 auto-recovery
 ip arp synchronize
!
{%- endif %}
{%- for pc in port_channels %}
interface port-channel{{ pc.id }}
 description {{ pc.description }}
{%- if pc.type == "L3" %}
 no switchport
{%- if pc.ipv4 is defined %}
 ip address {{ pc.ipv4 }}
{%- endif %}
{%- else %}
 switchport
 switchport mode trunk
{%- if pc.native_vlan is defined %}
 switchport trunk native vlan {{ pc.native_vlan }}
{%- endif %}
{%- if pc.tagged_vlans is defined %}
 switchport trunk allowed vlan {{ pc.tagged_vlans }}
{%- endif %}
{%- if pc.is_peer_link %}
 spanning-tree port type network
 vpc peer-link
{%- endif %}
{%- endif %}
 no shutdown
!
{%- for member in pc.members %}
interface Ethernet{{ member }}
 channel-group {{ pc.id }} mode active
 no shutdown
!
{%- endfor %}
{%- endfor %}
{%- if has_prefix_lists %}
{%- for name, entries in prefix_lists %}
{%- for entry in entries %}
ip prefix-list {{ name }} seq {{ entry.seq }} {{ entry.action }} {{ entry.prefix }}{% if entry.ge is defined %} ge {{ entry.ge }}{% endif %}{% if entry.le is defined %} le {{ entry.le }}{% endif %}
{%- endfor %}
{%- endfor %}
!
{%- endif %}
{%- if has_bgp %}
router bgp {{ bgp.asn }}
 router-id {{ bgp.router_id }}
 bestpath as-path multipath-relax
 log-neighbor-changes
 address-family ipv4 unicast
{%- for network in bgp.networks %}
  network {{ network }}
{%- endfor %}
  maximum-paths 8
{%- for n in bgp.neighbors %}
 neighbor {{ n.ip }}
  remote-as {{ n.remote_as }}
  description {{ n.description }}
{%- if n.update_source is defined %}
  update-source {{ n.update_source }}
{%- endif %}
{%- if n.ebgp_multihop is defined %}
  ebgp-multihop {{ n.ebgp_multihop }}
{%- endif %}
  address-family ipv4 unicast
{%- if n.af_ipv4_unicast is defined %}
{%- if n.af_ipv4_unicast.prefix_list_in is defined %}
   prefix-list {{ n.af_ipv4_unicast.prefix_list_in }} in
{%- endif %}
{%- if n.af_ipv4_unicast.prefix_list_out is defined %}
   prefix-list {{ n.af_ipv4_unicast.prefix_list_out }} out
{%- endif %}
{%- endif %}
   maximum-prefix 12000 warning-only
{%- endfor %}
!
{%- endif %}
{%- if has_static_routes %}
{%- for route in static_routes %}
ip route {{ route.prefix }} {{ route.next_hop }}{% if route.name is defined %} name {{ route.name }}{% endif %}
{%- endfor %}
{%- endif %}
{%- for vlan in vlans %}
{%- if vlan.interface is defined and vlan.interface.ip is defined %}
! Vlan{{ vlan.vlan_id }} {{ vlan.interface.ip }} {{ vlan.interface.cidr | subnet_mask }}
{%- endif %}
{%- endfor %}
!
end
"#;
