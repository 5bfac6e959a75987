#![allow(dead_code)]

use refdoc_core::config::RefdocConfig;
use refdoc_core::snapshot::{DataTables, Snapshot};
use refdoc_core::types::TypeSystem;
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("refdoc_core=debug")
            .with_test_writer()
            .try_init();
    });
}

/// Assembles snapshot JSON one type at a time. Names and packages are
/// interned; every type constructor returns the new type id.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    types: Vec<Value>,
    names: Vec<String>,
    packages: Vec<String>,
    parameters: Vec<Value>,
    bindings: Vec<Value>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&mut self, name: &str) -> u32 {
        intern(&mut self.names, name)
    }

    fn package(&mut self, package: &str) -> u32 {
        intern(&mut self.packages, package)
    }

    fn push(&mut self, record: Value) -> u32 {
        self.types.push(record);
        (self.types.len() - 1) as u32
    }

    /// A public class. `fqn` is split at its last `.` into package and name.
    pub fn class(&mut self, fqn: &str) -> u32 {
        let (package, name) = fqn.rsplit_once('.').unwrap_or(("", fqn));
        let mut record = Map::new();
        record.insert("n".into(), json!(self.name(name)));
        if !package.is_empty() {
            record.insert("P".into(), json!(self.package(package)));
        }
        record.insert("M".into(), json!(1));
        self.push(Value::Object(record))
    }

    pub fn type_variable(&mut self, name: &str) -> u32 {
        let name = self.name(name);
        self.push(json!({ "tv": name }))
    }

    pub fn parameterized(&mut self, raw: u32, arguments: &[u32]) -> u32 {
        self.push(json!({ "r": raw, "v": arguments }))
    }

    pub fn wildcard(&mut self, upper: &[u32], lower: &[u32]) -> u32 {
        let mut record = Map::new();
        if !upper.is_empty() {
            record.insert("u".into(), json!(upper));
        }
        if !lower.is_empty() {
            record.insert("l".into(), json!(lower));
        }
        self.push(Value::Object(record))
    }

    /// Sets a raw key on an already added type.
    pub fn set(&mut self, id: u32, key: &str, value: Value) -> &mut Self {
        if let Some(Value::Object(record)) = self.types.get_mut(id as usize) {
            record.insert(key.to_string(), value);
        }
        self
    }

    pub fn extends(&mut self, id: u32, parent: u32) -> &mut Self {
        self.set(id, "s", json!(parent))
    }

    pub fn implements(&mut self, id: u32, interfaces: &[u32]) -> &mut Self {
        self.set(id, "i", json!(interfaces))
    }

    pub fn declares(&mut self, id: u32, variables: &[u32]) -> &mut Self {
        self.set(id, "v", json!(variables))
    }

    fn append(&mut self, id: u32, key: &str, member: Value) {
        if let Some(Value::Object(record)) = self.types.get_mut(id as usize) {
            let slot = record.entry(key.to_string()).or_insert_with(|| json!([]));
            if let Value::Array(items) = slot {
                items.push(member);
            }
        }
    }

    /// Encoded `[name, type, modifiers, annotations]`.
    pub fn field(&mut self, owner: u32, name: &str, ty: u32, modifiers: u32) -> &mut Self {
        let name = self.name(name);
        self.append(owner, "f", json!(format!("{},{},{},", name, ty, modifiers)));
        self
    }

    /// A field whose name id is absent.
    pub fn unnamed_field(&mut self, owner: u32, ty: u32) -> &mut Self {
        self.append(owner, "f", json!(format!(",{},1,", ty)));
        self
    }

    pub fn parameter(&mut self, name: &str, ty: u32) -> u32 {
        let name = self.name(name);
        self.parameters.push(json!(format!("{},{},,", name, ty)));
        (self.parameters.len() - 1) as u32
    }

    /// Encoded `[name, modifiers, returnType, annotations, parameters,
    /// typeVariables, exceptions]`.
    pub fn method(&mut self, owner: u32, name: &str, returns: u32, parameters: &[u32]) -> &mut Self {
        let name = self.name(name);
        let params = encode_list(parameters);
        self.append(
            owner,
            "m",
            json!(format!("{},1,{},,{},,", name, returns, params)),
        );
        self
    }

    /// Appends a raw, already encoded member record.
    pub fn raw_member(&mut self, owner: u32, key: &str, encoded: &str) -> &mut Self {
        self.append(owner, key, json!(encoded));
        self
    }

    pub fn binding(&mut self, name: &str, ty: u32, data: Option<Value>) -> &mut Self {
        let mut entry = vec![json!(name), json!(ty)];
        entry.extend(data);
        self.bindings.push(Value::Array(entry));
        self
    }

    pub fn to_json(&self) -> Value {
        json!({
            "types": self.types,
            "names": self.names,
            "packages": self.packages.iter().map(|p| json!([p])).collect::<Vec<_>>(),
            "parameters": self.parameters,
            "bindings": self.bindings,
        })
    }

    pub fn build(&self) -> Snapshot {
        serde_json::from_value(self.to_json()).expect("builder produced an invalid snapshot")
    }

    pub fn system(&self) -> TypeSystem {
        TypeSystem::new(
            Arc::new(DataTables::new(self.build())),
            Arc::new(RefdocConfig::default()),
        )
    }

    pub fn write(&self, dir: &Path) -> PathBuf {
        let path = dir.join("snapshot.json");
        std::fs::write(&path, serde_json::to_vec(&self.to_json()).unwrap()).unwrap();
        path
    }
}

fn intern(table: &mut Vec<String>, value: &str) -> u32 {
    match table.iter().position(|v| v == value) {
        Some(index) => index as u32,
        None => {
            table.push(value.to_string());
            (table.len() - 1) as u32
        }
    }
}

fn encode_list(ids: &[u32]) -> String {
    if ids.is_empty() {
        return String::new();
    }
    let joined: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    format!("[{}]", joined.join("|"))
}

/// `Object`, `Number`, `Integer`, `String` in `java.lang`, then
/// `Box<T> { T value; T get(); Object put(T item) }`, `Box<Integer>` and
/// `IntBox extends Box<Integer> { Integer extra }`.
pub struct BoxFixture {
    pub builder: SnapshotBuilder,
    pub object: u32,
    pub number: u32,
    pub integer: u32,
    pub string: u32,
    pub t: u32,
    pub boxed: u32,
    pub box_of_integer: u32,
    pub int_box: u32,
}

pub fn box_fixture() -> BoxFixture {
    let mut b = SnapshotBuilder::new();
    let object = b.class("java.lang.Object");
    let number = b.class("java.lang.Number");
    b.extends(number, object);
    let integer = b.class("java.lang.Integer");
    b.extends(integer, number);
    let string = b.class("java.lang.String");
    b.extends(string, object);

    let t = b.type_variable("T");
    let boxed = b.class("demo.Box");
    b.extends(boxed, object).declares(boxed, &[t]);
    b.field(boxed, "value", t, 2);
    let item = b.parameter("item", t);
    b.method(boxed, "get", t, &[]).method(boxed, "put", object, &[item]);

    let box_of_integer = b.parameterized(boxed, &[integer]);
    let int_box = b.class("demo.IntBox");
    b.extends(int_box, box_of_integer);
    b.field(int_box, "extra", integer, 1);

    BoxFixture {
        builder: b,
        object,
        number,
        integer,
        string,
        t,
        boxed,
        box_of_integer,
        int_box,
    }
}
