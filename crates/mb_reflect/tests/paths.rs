//! End-to-end property path resolution over the public API.

use mb_reflect::derive::PropValue;
use mb_reflect::{DescriptorCache, MetaType, MetaValue, PropMap, ReflectError, copy_matching};

#[derive(PropValue, Default, Clone, Debug)]
#[prop(default, clone)]
struct Order {
    id: i64,
    items: Vec<Item>,
    shipping: Option<Address>,
    customer: Customer,
}

#[derive(PropValue, Default, Clone, Debug)]
#[prop(default, clone)]
struct Item {
    sku: String,
    unit_price: f64,
    quantity: u32,
}

#[derive(PropValue, Default, Clone, Debug)]
#[prop(default, clone)]
struct Address {
    city: String,
    zip: String,
}

#[derive(PropValue, Default, Clone, Debug)]
#[prop(default, clone)]
struct Customer {
    name: String,
    #[prop(readonly)]
    account_no: i64,
    #[prop(skip)]
    session: Session,
}

// Not a PropValue; skipped fields need nothing from the crate.
#[derive(Default, Clone, Debug)]
struct Session;

fn sample() -> Order {
    Order {
        id: 1001,
        items: vec![
            Item {
                sku: "KB-12".to_string(),
                unit_price: 59.0,
                quantity: 1,
            },
            Item {
                sku: "MS-07".to_string(),
                unit_price: 19.5,
                quantity: 2,
            },
        ],
        shipping: None,
        customer: Customer {
            name: "Ada".to_string(),
            account_no: 77,
            session: Session,
        },
    }
}

#[test]
fn nested_reads() {
    let mut order = sample();
    let mut meta = MetaValue::with_default_env(&mut order);

    let sku = meta.get_value("items[1].sku").unwrap().unwrap();
    assert_eq!(sku.downcast_ref::<String>().map(String::as_str), Some("MS-07"));

    let name = meta.get_value("customer.name").unwrap().unwrap();
    assert_eq!(name.downcast_ref::<String>().map(String::as_str), Some("Ada"));

    // Null links read as absent, not as errors.
    assert!(meta.get_value("shipping.city").unwrap().is_none());

    // Out-of-range positions are errors, absent values are not.
    let err = meta.get_value("items[5].sku").unwrap_err();
    assert_eq!(err, ReflectError::IndexOutOfBounds { index: 5, len: 2 });
}

#[test]
fn nested_writes() {
    let mut order = sample();
    let mut meta = MetaValue::with_default_env(&mut order);

    meta.set_value("items[0].quantity", Box::new(3_u32)).unwrap();
    meta.set_value("customer.name", Box::new("Grace".to_string()))
        .unwrap();
    drop(meta);

    assert_eq!(order.items[0].quantity, 3);
    assert_eq!(order.customer.name, "Grace");
}

#[test]
fn writing_through_a_null_link_materializes_it() {
    let mut order = sample();
    let mut meta = MetaValue::with_default_env(&mut order);

    meta.set_value("shipping.city", Box::new("Bergen".to_string()))
        .unwrap();
    meta.set_value("shipping.zip", Box::new("5003".to_string()))
        .unwrap();
    drop(meta);

    let shipping = order.shipping.expect("write should have filled the slot");
    assert_eq!(shipping.city, "Bergen");
    assert_eq!(shipping.zip, "5003");
}

#[test]
fn clearing_and_null_links() {
    let mut order = sample();
    order.shipping = Some(Address {
        city: "Bergen".to_string(),
        zip: "5003".to_string(),
    });
    let mut meta = MetaValue::with_default_env(&mut order);

    meta.clear_value("shipping").unwrap();
    assert!(meta.get_value("shipping").unwrap().is_none());

    // Clearing behind a now-null link is a no-op.
    meta.clear_value("shipping.city").unwrap();
}

#[test]
fn readonly_properties_reject_writes_but_read_fine() {
    let mut order = sample();
    let mut meta = MetaValue::with_default_env(&mut order);

    let account = meta.get_value("customer.account_no").unwrap().unwrap();
    assert_eq!(account.downcast_ref::<i64>(), Some(&77));

    let err = meta
        .set_value("customer.account_no", Box::new(1_i64))
        .unwrap_err();
    assert!(matches!(err, ReflectError::NoSetter { .. }));
    assert!(!meta.has_setter("customer.account_no"));
    assert!(meta.has_getter("customer.account_no"));
}

#[test]
fn skipped_fields_are_not_properties() {
    let mut order = sample();
    let mut meta = MetaValue::with_default_env(&mut order);

    assert!(!meta.has_getter("customer.session"));
    assert!(meta.get_value("customer.session").is_err());

    let names = MetaType::for_type::<Customer>(DescriptorCache::global()).descriptor().getter_names().to_vec();
    assert_eq!(names, ["account_no", "name"]);
}

#[test]
fn type_mismatch_on_write_is_reported() {
    let mut order = sample();
    let mut meta = MetaValue::with_default_env(&mut order);

    let err = meta.set_value("id", Box::new("nope".to_string())).unwrap_err();
    assert!(matches!(err, ReflectError::ValueType { .. }));
}

#[test]
fn case_insensitive_lookup() {
    let mut order = sample();
    let mut meta = MetaValue::with_default_env(&mut order);

    assert_eq!(
        meta.find_property("Customer.Name", false),
        Some("customer.name".to_string()),
    );
    assert_eq!(
        meta.find_property("items[0].unitprice", true),
        Some("items.unit_price".to_string()),
    );
    assert_eq!(meta.find_property("customer.missing", false), None);
}

#[test]
fn static_resolution_agrees_with_the_live_one() {
    let cache = DescriptorCache::new();
    let meta = MetaType::for_type::<Order>(&cache);

    assert!(meta.getter_type("items[0].unit_price").unwrap().is::<f64>());
    assert!(meta.getter_type("shipping.city").unwrap().is::<String>());
    assert!(meta.has_getter("customer.account_no"));
    assert!(!meta.has_setter("customer.account_no"));
}

#[test]
fn prop_maps_materialize_whole_paths() {
    let mut data = PropMap::new();
    let mut meta = MetaValue::with_default_env(&mut data);

    meta.set_value("report.totals.count", Box::new(12_i64)).unwrap();
    meta.set_value("report.title", Box::new("Q3".to_string())).unwrap();

    let count = meta.get_value("report.totals.count").unwrap().unwrap();
    assert_eq!(count.downcast_ref::<i64>(), Some(&12));

    // Absent keys read as absent; present intermediates are real maps.
    assert!(meta.get_value("report.missing").unwrap().is_none());
    let title_ty = meta.getter_type("report.title").unwrap();
    assert!(title_ty.is::<String>());
}

#[test]
fn sequences_append() {
    let mut items: Vec<Item> = Vec::new();
    let mut meta = MetaValue::with_default_env(&mut items);

    assert!(meta.is_sequence());
    meta.append(Box::new(Item {
        sku: "KB-12".to_string(),
        unit_price: 59.0,
        quantity: 1,
    }))
    .unwrap();
    drop(meta);
    assert_eq!(items.len(), 1);
}

#[test]
fn copying_shared_properties() {
    let source = sample();
    let mut target = Order::default();

    let cache = DescriptorCache::new();
    let copied = copy_matching(&source, &mut target, &cache).unwrap();

    // Everything except the read-only account number.
    assert!(copied >= 3);
    assert_eq!(target.id, 1001);
    assert_eq!(target.items.len(), 2);
}
