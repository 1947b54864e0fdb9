use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use crate::shared_types::{default_name, default_pivot, default_true, Point};
use crate::skeleton_data::transform::RawTransform;
use crate::skeleton_data::actions::RawActionData;

#[derive(Clone, Deserialize, Debug)]
pub struct RawSkinData {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(rename = "slot")]
    #[serde(default)]
    pub slots: Vec<RawSkinSlot>,
}

#[derive(Clone, Deserialize, Debug)]
pub struct RawSkinSlot {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(rename = "display")]
    #[serde(default)]
    pub displays: Vec<RawDisplay>,
}

#[derive(Clone, Debug)]
pub enum RawDisplay {
    Image(RawImageDisplay),
    Mesh(RawMeshDisplay),
    Armature(RawArmatureDisplay),
    // Kept so display indices stay aligned; resolves to an empty entry.
    BoundingBox { name: String },
}

#[derive(Clone, Deserialize, Debug)]
pub struct RawImageDisplay {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default = "default_pivot")]
    pub pivot: Point,
    #[serde(default)]
    pub transform: RawTransform,
}

#[derive(Clone, Deserialize, Debug)]
pub struct RawMeshDisplay {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(rename = "inheritDeform")]
    #[serde(default = "default_true")]
    pub inherit_deform: bool,
    #[serde(default)]
    pub vertices: Vec<f32>,
    #[serde(default)]
    pub uvs: Vec<f32>,
    #[serde(default)]
    pub triangles: Vec<u32>,
    #[serde(default)]
    pub weights: Vec<f32>,
    #[serde(rename = "slotPose")]
    #[serde(default)]
    pub slot_pose: Vec<f32>,
    #[serde(rename = "bonePose")]
    #[serde(default)]
    pub bone_pose: Vec<f32>,
    #[serde(default)]
    pub transform: RawTransform,
}

#[derive(Clone, Deserialize, Debug)]
pub struct RawArmatureDisplay {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(rename = "inheritAnimation")]
    #[serde(default = "default_true")]
    pub inherit_animation: bool,
    #[serde(default)]
    pub actions: Vec<RawActionData>,
    #[serde(default)]
    pub transform: RawTransform,
}

impl<'de> Deserialize<'de> for RawDisplay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
        let value: Value = Deserialize::deserialize(deserializer)?;
        let fields = match value {
            Value::Object(fields) => fields,
            _ => return Err(serde::de::Error::custom("Unexpected JSON field type! Object expected")),
        };

        // An entry without a tag is an image.
        let tag = match fields.get("type") {
            None => "image".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(serde::de::Error::custom("Unexpected JSON field type! String expected")),
        };

        match tag.as_str() {
            "image" => RawDisplay::parse_fields(fields).map(RawDisplay::Image),
            "mesh" => RawDisplay::parse_fields(fields).map(RawDisplay::Mesh),
            "armature" => RawDisplay::parse_fields(fields).map(RawDisplay::Armature),
            "boundingBox" => {
                let name = match fields.get("name") {
                    Some(Value::String(s)) => s.clone(),
                    _ => String::new(),
                };
                Ok(RawDisplay::BoundingBox { name })
            }
            other => Err(serde::de::Error::custom(format!(
                "Unexpected tag `{}`! Expected \"image\", \"mesh\", \"armature\" or \"boundingBox\"",
                other
            ))),
        }
    }
}

impl RawDisplay {
    fn parse_fields<T, E>(fields: Map<String, Value>) -> Result<T, E>
    where
        T: serde::de::DeserializeOwned,
        E: serde::de::Error,
    {
        serde_json::from_value(Value::Object(fields)).map_err(E::custom)
    }

    pub fn name(&self) -> &str {
        match self {
            RawDisplay::Image(image) => &image.name,
            RawDisplay::Mesh(mesh) => &mesh.name,
            RawDisplay::Armature(armature) => &armature.name,
            RawDisplay::BoundingBox { name } => name,
        }
    }
}
