//! JSON Schema fragments for values whose wire form is a constrained string.

use schemars::gen::SchemaGenerator;
use schemars::schema::{
    ArrayValidation, InstanceType, NumberValidation, ObjectValidation, Schema, SchemaObject, SingleOrVec,
    StringValidation, SubschemaValidation,
};

const OCTET: &str = r"(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])";

fn addr_pattern() -> String {
    format!(r"^{o}(\.{o}){{3}}$", o = OCTET)
}

fn net_pattern() -> String {
    format!(r"^{o}(\.{o}){{3}}/(3[0-2]|[12]?[0-9])$", o = OCTET)
}

pub(crate) fn string_matching(pattern: impl Into<String>, nullable: bool) -> Schema {
    let instance_type = if nullable {
        SingleOrVec::Vec(vec![InstanceType::String, InstanceType::Null])
    } else {
        InstanceType::String.into()
    };
    SchemaObject {
        instance_type: Some(instance_type),
        string: Some(Box::new(StringValidation {
            pattern: Some(pattern.into()),
            ..Default::default()
        })),
        ..Default::default()
    }
    .into()
}

pub(crate) fn integer(min: f64, max: f64) -> Schema {
    SchemaObject {
        instance_type: Some(InstanceType::Integer.into()),
        number: Some(Box::new(NumberValidation {
            minimum: Some(min),
            maximum: Some(max),
            ..Default::default()
        })),
        ..Default::default()
    }
    .into()
}

pub(crate) fn any_of(schemas: Vec<Schema>) -> Schema {
    SchemaObject {
        subschemas: Some(Box::new(SubschemaValidation {
            any_of: Some(schemas),
            ..Default::default()
        })),
        ..Default::default()
    }
    .into()
}

fn null() -> Schema {
    SchemaObject {
        instance_type: Some(InstanceType::Null.into()),
        ..Default::default()
    }
    .into()
}

pub fn ipv4_addr(_: &mut SchemaGenerator) -> Schema {
    string_matching(addr_pattern(), false)
}

pub fn ipv4_addr_opt(_: &mut SchemaGenerator) -> Schema {
    string_matching(addr_pattern(), true)
}

pub fn ipv4_net(_: &mut SchemaGenerator) -> Schema {
    string_matching(net_pattern(), false)
}

pub fn ipv4_net_opt(_: &mut SchemaGenerator) -> Schema {
    string_matching(net_pattern(), true)
}

pub fn ipv4_net_list(_: &mut SchemaGenerator) -> Schema {
    SchemaObject {
        instance_type: Some(InstanceType::Array.into()),
        array: Some(Box::new(ArrayValidation {
            items: Some(SingleOrVec::Single(Box::new(string_matching(net_pattern(), false)))),
            ..Default::default()
        })),
        ..Default::default()
    }
    .into()
}

/// Canonical vendor identifier; it becomes a template directory name.
pub fn vendor_name(_: &mut SchemaGenerator) -> Schema {
    string_matching(r"^[a-z0-9_]+$", false)
}

/// A VLAN id written as a number or a numeric string; blank means none.
pub fn vlan_ref(_: &mut SchemaGenerator) -> Schema {
    any_of(vec![
        integer(1.0, 4094.0),
        string_matching(r"^\s*([0-9]{1,4})?\s*$", false),
        null(),
    ])
}

/// `svi_ips`: VLAN id keys to host addresses.
pub fn svi_ips(gen: &mut SchemaGenerator) -> Schema {
    let mut pattern_properties = schemars::Map::new();
    pattern_properties.insert(r"^[0-9]{1,4}$".to_string(), ipv4_addr(gen));
    SchemaObject {
        instance_type: Some(InstanceType::Object.into()),
        object: Some(Box::new(ObjectValidation {
            pattern_properties,
            additional_properties: Some(Box::new(Schema::Bool(false))),
            ..Default::default()
        })),
        ..Default::default()
    }
    .into()
}
