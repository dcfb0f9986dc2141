use serde::Serialize;
use serde_json::{Map, Value};

pub const VPC_COLUMNS: [&str; 5] = ["VpcId", "CidrBlock", "IsDefault", "State", "Tags"];

pub const SUBNET_COLUMNS: [&str; 6] = [
    "SubnetId",
    "VpcId",
    "CidrBlock",
    "AvailabilityZone",
    "State",
    "MapPublicIpOnLaunch",
];

/// One element of the `vpcs` or `subnets` array.
///
/// Fields are kept as raw JSON values; nothing beyond the rendered columns is
/// ever inspected.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Non-object array elements carry no fields and render as blank rows.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self(fields),
            _ => Self::default(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct InventoryDocument {
    pub timestamp: String,
    #[serde(rename = "vpcCount", skip_serializing_if = "Option::is_none")]
    pub vpc_count: Option<u64>,
    #[serde(rename = "subnetCount", skip_serializing_if = "Option::is_none")]
    pub subnet_count: Option<u64>,
    pub vpcs: Vec<Record>,
    pub subnets: Vec<Record>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MissingArrays;

/// Checks the shape of a parsed response body and lifts it into a document.
///
/// Both `vpcs` and `subnets` must be arrays; anything else (including a
/// non-object top-level value) is rejected as a whole.
pub fn from_json(value: Value) -> Result<InventoryDocument, MissingArrays> {
    let Value::Object(mut root) = value else {
        return Err(MissingArrays);
    };
    let vpcs = match root.remove("vpcs") {
        Some(Value::Array(items)) => items,
        _ => return Err(MissingArrays),
    };
    let subnets = match root.remove("subnets") {
        Some(Value::Array(items)) => items,
        _ => return Err(MissingArrays),
    };

    let timestamp = match root.remove("timestamp") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    };

    Ok(InventoryDocument {
        timestamp,
        vpc_count: root.get("vpcCount").and_then(Value::as_u64),
        subnet_count: root.get("subnetCount").and_then(Value::as_u64),
        vpcs: vpcs.into_iter().map(Record::from_value).collect(),
        subnets: subnets.into_iter().map(Record::from_value).collect(),
    })
}
