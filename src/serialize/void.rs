use std::collections::HashMap;
use std::fmt::Write as _;

use md5::{Digest, Md5};

use crate::model::pattern::ObjectKind;
use crate::model::schema::MinedSchema;

const BASE_URI: &str = "urn:void:partition:";
const VOID: &str = "http://rdfs.org/ns/void#";
const VOID_EXT: &str = "http://ldf.fi/void-ext#";

fn md5_hex12(input: &str) -> String {
    let digest = Md5::digest(input.as_bytes());
    hex::encode(digest)[..12].to_string()
}

/// Serialize a mined schema as a VoID partition graph in Turtle: one
/// `cp_{md5(uri)[:12]}` class-partition node per subject/object class, one
/// `pp_{md5}` property-partition node per discovered pattern, and a
/// `dtype_{md5}` node per literal datatype.
pub fn to_void_turtle(schema: &MinedSchema) -> String {
    let mut lines = Vec::new();
    lines.push(format!("@prefix void: <{VOID}> ."));
    lines.push(format!("@prefix void-ext: <{VOID_EXT}> ."));
    lines.push("@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .".to_string());
    lines.push(String::new());

    fn class_node(class: &str, class_nodes: &mut HashMap<String, String>, class_order: &mut Vec<String>) -> String {
        class_nodes
            .entry(class.to_string())
            .or_insert_with(|| {
                class_order.push(class.to_string());
                format!("{BASE_URI}cp_{}", md5_hex12(class))
            })
            .clone()
    }

    let mut class_nodes: HashMap<String, String> = HashMap::new();
    let mut class_order: Vec<String> = Vec::new();
    let mut body = String::new();

    for pattern in &schema.patterns {
        let cp = class_node(&pattern.subject_class, &mut class_nodes, &mut class_order);

        let object_key = match &pattern.object_kind {
            ObjectKind::Class(uri) => uri.clone(),
            ObjectKind::Literal { datatype } => datatype.clone().unwrap_or_default(),
            ObjectKind::Resource => String::new(),
        };
        let pp_seed = format!("{}_{}_{}", pattern.subject_class, pattern.property_uri, object_key);
        let pp = format!("{BASE_URI}pp_{}", md5_hex12(&pp_seed));

        let _ = writeln!(body, "<{cp}> void:propertyPartition <{pp}> .");
        let _ = writeln!(body, "<{pp}> void:property <{}> .", pattern.property_uri);
        let _ = writeln!(body, "<{pp}> void-ext:subjectClass <{}> .", pattern.subject_class);

        match &pattern.object_kind {
            ObjectKind::Class(object_class) => {
                let oc = class_node(object_class, &mut class_nodes, &mut class_order);
                let _ = writeln!(body, "<{pp}> void:classPartition <{oc}> .");
                let _ = writeln!(body, "<{pp}> void-ext:objectClass <{object_class}> .");
            }
            ObjectKind::Literal { datatype: Some(dt) } => {
                let dtype_node = format!("{BASE_URI}dtype_{}", md5_hex12(dt));
                let _ = writeln!(body, "<{pp}> void-ext:datatypePartition <{dtype_node}> .");
                let _ = writeln!(body, "<{dtype_node}> void-ext:datatype <{dt}> .");
            }
            ObjectKind::Literal { datatype: None } | ObjectKind::Resource => {}
        }

        if let Some(count) = pattern.count {
            let _ = writeln!(body, "<{pp}> void:triples {count} .");
        }
        body.push('\n');
    }

    for class in &class_order {
        let node = &class_nodes[class];
        lines.push(format!("<{node}> void:class <{class}> ."));
    }
    lines.push(String::new());
    lines.push(body);

    lines.join("\n")
}
