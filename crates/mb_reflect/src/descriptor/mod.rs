//! Resolved type descriptors.
//!
//! A [`TypeDescriptor`] is the digested form of a [`TypeSchema`]: exactly one
//! read accessor and one write accessor per property, plus the lookup tables
//! the resolution layers query. Building a descriptor never fails. When two
//! candidates for a property cannot be ordered, the property is kept with a
//! poisoned accessor that reports the ambiguity on first use.

use std::collections::{BTreeMap, HashMap};

use crate::error::ReflectError;
use crate::path::naming;
use crate::schema::{GetterCandidate, ReadFn, ReadMutFn, SetterCandidate, TypeSchema, WriteFn};
use crate::token::TypeToken;
use crate::value::PropValue;

mod cache;

pub use cache::DescriptorCache;

// -----------------------------------------------------------------------------
// Accessors

enum Invoker<F> {
    Call(F),
    /// Conflict resolution failed for this accessor; invoking it reports
    /// the recorded message.
    Poisoned(String),
}

/// The resolved read accessor of one property.
pub struct ReadAccessor {
    value_type: TypeToken,
    call: Invoker<ReadFn>,
    call_mut: Option<ReadMutFn>,
}

impl ReadAccessor {
    /// The declared type of the property value.
    pub fn value_type(&self) -> TypeToken {
        self.value_type
    }

    pub fn is_poisoned(&self) -> bool {
        matches!(self.call, Invoker::Poisoned(_))
    }

    pub fn invoke<'a>(&self, base: &'a dyn PropValue) -> Result<&'a dyn PropValue, ReflectError> {
        match &self.call {
            Invoker::Call(read) => read(base),
            Invoker::Poisoned(message) => Err(ReflectError::AmbiguousAccessor {
                message: message.clone(),
            }),
        }
    }

    pub fn invoke_mut<'a>(
        &self,
        base: &'a mut dyn PropValue,
        property: &str,
    ) -> Result<&'a mut dyn PropValue, ReflectError> {
        if let Invoker::Poisoned(message) = &self.call {
            return Err(ReflectError::AmbiguousAccessor {
                message: message.clone(),
            });
        }
        match self.call_mut {
            Some(read_mut) => read_mut(base),
            None => Err(ReflectError::NoMutAccess {
                property: property.to_string(),
                type_path: base.type_token().path(),
            }),
        }
    }
}

/// The resolved write accessor of one property.
pub struct WriteAccessor {
    value_type: TypeToken,
    call: Invoker<WriteFn>,
}

impl WriteAccessor {
    pub fn value_type(&self) -> TypeToken {
        self.value_type
    }

    pub fn is_poisoned(&self) -> bool {
        matches!(self.call, Invoker::Poisoned(_))
    }

    pub fn invoke(
        &self,
        base: &mut dyn PropValue,
        value: Box<dyn PropValue>,
    ) -> Result<(), ReflectError> {
        match &self.call {
            Invoker::Call(write) => write(base, value),
            Invoker::Poisoned(message) => Err(ReflectError::AmbiguousAccessor {
                message: message.clone(),
            }),
        }
    }
}

// -----------------------------------------------------------------------------
// Descriptor

/// The resolved property table of one type.
pub struct TypeDescriptor {
    token: TypeToken,
    getters: HashMap<String, ReadAccessor>,
    setters: HashMap<String, WriteAccessor>,
    readable: Vec<String>,
    writable: Vec<String>,
    case_index: HashMap<String, String>,
    stripped_index: HashMap<String, String>,
    default_fn: Option<fn() -> Box<dyn PropValue>>,
}

impl TypeDescriptor {
    /// Resolves a schema into a descriptor. Never fails; see the module
    /// docs for how ambiguity is recorded instead.
    pub fn build(schema: TypeSchema) -> Self {
        let token = schema.token();
        let mut getters = HashMap::new();
        let mut setters = HashMap::new();

        resolve_getters(&schema, &mut getters);
        resolve_setters(&schema, &getters, &mut setters);
        add_fields(&schema, &mut getters, &mut setters);

        let mut readable: Vec<String> = getters.keys().cloned().collect();
        readable.sort();
        let mut writable: Vec<String> = setters.keys().cloned().collect();
        writable.sort();

        let mut case_index = HashMap::new();
        let mut stripped_index = HashMap::new();
        for name in readable.iter().chain(writable.iter()) {
            case_index.insert(name.to_uppercase(), name.clone());
            // Names without separators still need a stripped entry, or they
            // would vanish from separator-stripped lookups.
            let stripped: String = name.chars().filter(|c| *c != '_').collect();
            stripped_index.insert(stripped.to_uppercase(), name.clone());
        }

        let default_fn = schema.default_fn().or(token.default_fn());

        TypeDescriptor {
            token,
            getters,
            setters,
            readable,
            writable,
            case_index,
            stripped_index,
            default_fn,
        }
    }

    /// The descriptor of a type with no schema: no properties, with the
    /// token's default constructor if it declares one.
    pub fn empty(token: TypeToken) -> Self {
        TypeDescriptor {
            token,
            getters: HashMap::new(),
            setters: HashMap::new(),
            readable: Vec::new(),
            writable: Vec::new(),
            case_index: HashMap::new(),
            stripped_index: HashMap::new(),
            default_fn: token.default_fn(),
        }
    }

    pub fn token(&self) -> TypeToken {
        self.token
    }

    pub fn getter(&self, property: &str) -> Result<&ReadAccessor, ReflectError> {
        self.getters
            .get(property)
            .ok_or_else(|| ReflectError::no_getter(property, self.token.path()))
    }

    pub fn setter(&self, property: &str) -> Result<&WriteAccessor, ReflectError> {
        self.setters
            .get(property)
            .ok_or_else(|| ReflectError::no_setter(property, self.token.path()))
    }

    /// The declared type of a readable property. Available even when the
    /// accessor itself is poisoned.
    pub fn getter_type(&self, property: &str) -> Result<TypeToken, ReflectError> {
        self.getter(property).map(ReadAccessor::value_type)
    }

    /// The declared type of a writable property.
    pub fn setter_type(&self, property: &str) -> Result<TypeToken, ReflectError> {
        self.setter(property).map(WriteAccessor::value_type)
    }

    pub fn has_getter(&self, property: &str) -> bool {
        self.getters.contains_key(property)
    }

    pub fn has_setter(&self, property: &str) -> bool {
        self.setters.contains_key(property)
    }

    /// Readable property names, sorted.
    pub fn getter_names(&self) -> &[String] {
        &self.readable
    }

    /// Writable property names, sorted.
    pub fn setter_names(&self) -> &[String] {
        &self.writable
    }

    /// Case-insensitive lookup of a property's canonical name. With
    /// `strip_separators`, underscores in `name` are ignored as well, so
    /// `UNITPRICE` finds `unit_price`.
    pub fn find_name(&self, name: &str, strip_separators: bool) -> Option<&str> {
        if strip_separators {
            let key: String = name
                .chars()
                .filter(|c| *c != '_')
                .collect::<String>()
                .to_uppercase();
            self.stripped_index.get(&key).map(String::as_str)
        } else {
            self.case_index.get(&name.to_uppercase()).map(String::as_str)
        }
    }

    pub fn can_construct(&self) -> bool {
        self.default_fn.is_some()
    }

    /// Builds a default instance of the described type.
    pub fn construct(&self) -> Result<Box<dyn PropValue>, ReflectError> {
        match self.default_fn {
            Some(default_fn) => Ok(default_fn()),
            None => Err(ReflectError::NoDefaultConstructor {
                type_path: self.token.path(),
            }),
        }
    }
}

// -----------------------------------------------------------------------------
// Conflict resolution

fn resolve_getters(schema: &TypeSchema, getters: &mut HashMap<String, ReadAccessor>) {
    let type_path = schema.token().path();
    let mut conflicts: BTreeMap<&str, Vec<&GetterCandidate>> = BTreeMap::new();
    for cand in schema.getters() {
        if !naming::is_getter(cand.method) {
            continue;
        }
        let Some(property) = naming::property_of(cand.method) else {
            continue;
        };
        if !naming::is_valid_property(property) {
            continue;
        }
        conflicts.entry(property).or_default().push(cand);
    }

    for (property, candidates) in &conflicts {
        let mut winner = candidates[0];
        let mut ambiguous = false;
        for candidate in &candidates[1..] {
            let winner_ty = winner.value_type;
            let cand_ty = candidate.value_type;
            if cand_ty == winner_ty {
                if !cand_ty.is::<bool>() {
                    ambiguous = true;
                    break;
                }
                // Same boolean type twice: the is_-style form wins.
                if naming::is_bool_getter(candidate.method) {
                    winner = candidate;
                }
            } else if winner_ty.is_assignable_to(&cand_ty) {
                // The candidate is wider; keep the narrower winner.
            } else if cand_ty.is_assignable_to(&winner_ty) {
                winner = candidate;
            } else {
                ambiguous = true;
                break;
            }
        }
        let call = if ambiguous {
            Invoker::Poisoned(format!(
                "illegal overloaded getter with ambiguous type for property '{property}' \
                 on `{type_path}`; conflicting candidates declare unrelated types",
            ))
        } else {
            Invoker::Call(winner.read)
        };
        getters.insert(
            (*property).to_string(),
            ReadAccessor {
                value_type: winner.value_type,
                call,
                call_mut: winner.read_mut,
            },
        );
    }
}

fn resolve_setters(
    schema: &TypeSchema,
    getters: &HashMap<String, ReadAccessor>,
    setters: &mut HashMap<String, WriteAccessor>,
) {
    let type_path = schema.token().path();
    let mut conflicts: BTreeMap<&str, Vec<&SetterCandidate>> = BTreeMap::new();
    for cand in schema.setters() {
        if !naming::is_setter(cand.method) {
            continue;
        }
        let Some(property) = naming::property_of(cand.method) else {
            continue;
        };
        if !naming::is_valid_property(property) {
            continue;
        }
        conflicts.entry(property).or_default().push(cand);
    }

    for (property, candidates) in &conflicts {
        let getter = getters.get(*property);
        let getter_type = getter.map(ReadAccessor::value_type);
        let getter_ambiguous = getter.is_some_and(ReadAccessor::is_poisoned);
        let mut ambiguous = false;
        let mut found: Option<&SetterCandidate> = None;
        for candidate in candidates {
            if !getter_ambiguous && Some(candidate.value_type) == getter_type {
                // Exact match to the resolved getter type is final.
                found = Some(candidate);
                break;
            }
            if !ambiguous {
                found = pick_better_setter(found, candidate, property, type_path, setters);
                ambiguous = found.is_none();
            }
        }
        if let Some(candidate) = found {
            setters.insert(
                (*property).to_string(),
                WriteAccessor {
                    value_type: candidate.value_type,
                    call: Invoker::Call(candidate.write),
                },
            );
        }
    }
}

/// Orders two setter candidates by parameter assignability. When neither
/// accepts the other's parameter, the property is poisoned immediately and
/// `None` makes the caller stop comparing.
fn pick_better_setter<'c>(
    current: Option<&'c SetterCandidate>,
    candidate: &'c SetterCandidate,
    property: &str,
    type_path: &'static str,
    setters: &mut HashMap<String, WriteAccessor>,
) -> Option<&'c SetterCandidate> {
    let Some(current) = current else {
        return Some(candidate);
    };
    if candidate.value_type.is_assignable_to(&current.value_type) {
        Some(candidate)
    } else if current.value_type.is_assignable_to(&candidate.value_type) {
        Some(current)
    } else {
        let message = format!(
            "ambiguous setters defined for property '{property}' on `{type_path}`, \
             with types `{}` and `{}`",
            current.value_type.path(),
            candidate.value_type.path(),
        );
        setters.insert(
            property.to_string(),
            WriteAccessor {
                value_type: current.value_type,
                call: Invoker::Poisoned(message),
            },
        );
        None
    }
}

/// Field slots only back properties no method pair already claims.
fn add_fields(
    schema: &TypeSchema,
    getters: &mut HashMap<String, ReadAccessor>,
    setters: &mut HashMap<String, WriteAccessor>,
) {
    for slot in schema.fields() {
        if !naming::is_valid_property(slot.name) {
            continue;
        }
        if !setters.contains_key(slot.name) {
            if let Some(write) = slot.write {
                setters.insert(
                    slot.name.to_string(),
                    WriteAccessor {
                        value_type: slot.value_type,
                        call: Invoker::Call(write),
                    },
                );
            }
        }
        if !getters.contains_key(slot.name) {
            getters.insert(
                slot.name.to_string(),
                ReadAccessor {
                    value_type: slot.value_type,
                    call: Invoker::Call(slot.read),
                    call_mut: slot.read_mut,
                },
            );
        }
    }
}

// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{StaticType, ValueKind};

    // A plain record with hand-written method accessors layered on top, so
    // every conflict path can be exercised.
    #[derive(mb_reflect_derive::PropValue, Default, Clone, Debug, PartialEq)]
    #[prop(default, clone)]
    struct Account {
        balance: i64,
        active: bool,
        label: String,
    }

    fn read_balance(base: &dyn PropValue) -> Result<&dyn PropValue, ReflectError> {
        let this = base
            .downcast_ref::<Account>()
            .ok_or_else(|| ReflectError::wrong_receiver::<Account>(base))?;
        Ok(&this.balance)
    }

    fn read_active(base: &dyn PropValue) -> Result<&dyn PropValue, ReflectError> {
        let this = base
            .downcast_ref::<Account>()
            .ok_or_else(|| ReflectError::wrong_receiver::<Account>(base))?;
        Ok(&this.active)
    }

    fn write_balance(base: &mut dyn PropValue, value: Box<dyn PropValue>) -> Result<(), ReflectError> {
        let found = base.type_token().path();
        let Some(this) = base.downcast_mut::<Account>() else {
            return Err(ReflectError::WrongReceiver {
                expected: std::any::type_name::<Account>(),
                found,
            });
        };
        this.balance = value
            .take::<i64>()
            .map_err(|v| ReflectError::value_type::<i64>(&*v))?;
        Ok(())
    }

    fn scalar<T: 'static>() -> TypeToken {
        TypeToken::of_type::<T>(ValueKind::Scalar)
    }

    fn account_token() -> TypeToken {
        <Account as StaticType>::token()
    }

    #[test]
    fn methods_shadow_fields() {
        let schema = TypeSchema::builder(account_token())
            .getter("get_balance", scalar::<i64>(), read_balance)
            .setter("set_balance", scalar::<i64>(), write_balance)
            .extend(<Account as crate::schema::Described>::schema())
            .build();
        let desc = TypeDescriptor::build(schema);

        assert!(desc.has_getter("balance"));
        assert!(desc.has_setter("balance"));
        // Field-backed properties still come through.
        assert!(desc.has_getter("label"));
        assert!(desc.has_setter("label"));

        let account = Account {
            balance: 12,
            ..Account::default()
        };
        let read = desc.getter("balance").unwrap().invoke(&account).unwrap();
        assert_eq!(read.downcast_ref::<i64>(), Some(&12));
    }

    #[test]
    fn boolean_is_form_beats_get_form() {
        let schema = TypeSchema::builder(account_token())
            .getter("get_active", scalar::<bool>(), read_active)
            .getter("is_active", scalar::<bool>(), read_active)
            .build();
        let desc = TypeDescriptor::build(schema);

        let acc = desc.getter("active").unwrap();
        assert!(!acc.is_poisoned());
        assert_eq!(acc.value_type(), scalar::<bool>());
    }

    #[test]
    fn identical_non_bool_types_poison_the_getter() {
        let schema = TypeSchema::builder(account_token())
            .getter("get_balance", scalar::<i64>(), read_balance)
            .getter("is_balance", scalar::<i64>(), read_balance)
            .build();
        let desc = TypeDescriptor::build(schema);

        // The property stays listed and its type stays queryable.
        assert!(desc.has_getter("balance"));
        assert_eq!(desc.getter_type("balance").unwrap(), scalar::<i64>());

        // Only invocation reports the conflict.
        let account = Account::default();
        let err = desc
            .getter("balance")
            .unwrap()
            .invoke(&account)
            .unwrap_err();
        assert!(matches!(err, ReflectError::AmbiguousAccessor { .. }));
    }

    struct Narrow;
    struct Wide;

    fn wide_token() -> TypeToken {
        TypeToken::of_type::<Wide>(ValueKind::Record)
    }

    fn narrow_token() -> TypeToken {
        static CHAIN: [fn() -> TypeToken; 1] = [wide_token];
        TypeToken::of_type::<Narrow>(ValueKind::Record).with_supers(&CHAIN)
    }

    fn read_self(base: &dyn PropValue) -> Result<&dyn PropValue, ReflectError> {
        Ok(base)
    }

    fn write_noop(_: &mut dyn PropValue, _: Box<dyn PropValue>) -> Result<(), ReflectError> {
        Ok(())
    }

    #[test]
    fn narrower_getter_type_wins() {
        let schema = TypeSchema::builder(account_token())
            .getter("get_value", wide_token(), read_self)
            .getter("is_value", narrow_token(), read_self)
            .build();
        let desc = TypeDescriptor::build(schema);

        let acc = desc.getter("value").unwrap();
        assert!(!acc.is_poisoned());
        assert_eq!(acc.value_type(), narrow_token());
    }

    #[test]
    fn unrelated_getter_types_poison() {
        let schema = TypeSchema::builder(account_token())
            .getter("get_value", scalar::<i64>(), read_self)
            .getter("is_value", scalar::<String>(), read_self)
            .build();
        let desc = TypeDescriptor::build(schema);
        assert!(desc.getter("value").unwrap().is_poisoned());
    }

    #[test]
    fn setter_matching_getter_type_is_chosen() {
        let schema = TypeSchema::builder(account_token())
            .getter("get_value", narrow_token(), read_self)
            .setter("set_value", wide_token(), write_noop)
            .setter("set_value", narrow_token(), write_noop)
            .build();
        let desc = TypeDescriptor::build(schema);

        let setter = desc.setter("value").unwrap();
        assert!(!setter.is_poisoned());
        assert_eq!(setter.value_type(), narrow_token());
    }

    #[test]
    fn unrelated_setter_types_poison_but_stay_registered() {
        let schema = TypeSchema::builder(account_token())
            .setter("set_value", scalar::<i64>(), write_noop)
            .setter("set_value", scalar::<String>(), write_noop)
            .build();
        let desc = TypeDescriptor::build(schema);

        assert!(desc.has_setter("value"));
        let setter = desc.setter("value").unwrap();
        assert!(setter.is_poisoned());
        // The first candidate's type is what the poisoned entry reports.
        assert_eq!(setter.value_type(), scalar::<i64>());

        let mut account = Account::default();
        let err = setter.invoke(&mut account, Box::new(1i64)).unwrap_err();
        assert!(matches!(err, ReflectError::AmbiguousAccessor { .. }));
    }

    #[test]
    fn double_underscore_slots_are_hidden() {
        let schema = TypeSchema::builder(account_token())
            .field("__marker", scalar::<i64>(), read_self, None, None)
            .build();
        let desc = TypeDescriptor::build(schema);
        assert!(!desc.has_getter("__marker"));
    }

    #[test]
    fn case_index_finds_canonical_names() {
        let desc = TypeDescriptor::build(<Account as crate::schema::Described>::schema());
        assert_eq!(desc.find_name("BALANCE", false), Some("balance"));
        assert_eq!(desc.find_name("Label", false), Some("label"));
        assert_eq!(desc.find_name("missing", false), None);
    }

    #[test]
    fn separator_stripped_lookup() {
        #[derive(mb_reflect_derive::PropValue, Default, Clone, Debug)]
        struct Line {
            unit_price: f64,
            sku: String,
        }

        let desc = TypeDescriptor::build(<Line as crate::schema::Described>::schema());
        assert_eq!(desc.find_name("UNITPRICE", true), Some("unit_price"));
        assert_eq!(desc.find_name("unitprice", true), Some("unit_price"));
        assert_eq!(desc.find_name("unit_price", false), Some("unit_price"));
        // Exact-mode lookups never see the stripped forms.
        assert_eq!(desc.find_name("unitprice", false), None);
        // Names without separators stay reachable in stripped mode.
        assert_eq!(desc.find_name("SKU", true), Some("sku"));
    }

    #[test]
    fn construct_uses_the_declared_default() {
        let desc = TypeDescriptor::build(<Account as crate::schema::Described>::schema());
        assert!(desc.can_construct());
        let built = desc.construct().unwrap();
        assert_eq!(built.downcast_ref::<Account>(), Some(&Account::default()));

        let bare = TypeDescriptor::empty(TypeToken::of_type::<Narrow>(ValueKind::Record));
        assert!(matches!(
            bare.construct(),
            Err(ReflectError::NoDefaultConstructor { .. }),
        ));
    }

    #[test]
    fn property_names_are_sorted() {
        let desc = TypeDescriptor::build(<Account as crate::schema::Described>::schema());
        assert_eq!(desc.getter_names(), ["active", "balance", "label"]);
        assert_eq!(desc.setter_names(), ["active", "balance", "label"]);
    }
}
