mod common;

use common::SnapshotBuilder;
use refdoc_core::model::TypeRef;
use refdoc_core::render::NameOptions;

#[test]
fn superclass_binding_wins_in_a_diamond() {
    // interface Source<Y>; class Base<X> implements Source<X>;
    // class Leaf extends Base<String> implements Source<Integer>
    let mut b = SnapshotBuilder::new();
    let object = b.class("java.lang.Object");
    let string = b.class("java.lang.String");
    let integer = b.class("java.lang.Integer");
    let y = b.type_variable("Y");
    let source = b.class("demo.Source");
    b.declares(source, &[y]);
    let x = b.type_variable("X");
    let base = b.class("demo.Base");
    b.extends(base, object).declares(base, &[x]);
    let source_of_x = b.parameterized(source, &[x]);
    b.implements(base, &[source_of_x]);
    let base_of_string = b.parameterized(base, &[string]);
    let source_of_integer = b.parameterized(source, &[integer]);
    let leaf = b.class("demo.Leaf");
    b.extends(leaf, base_of_string)
        .implements(leaf, &[source_of_integer]);

    let sys = b.system();
    let map = sys.type_variable_map(leaf).unwrap();
    assert_eq!(map.get(&x), Some(&TypeRef::new(string)));
    assert_eq!(map.get(&y), Some(&TypeRef::new(string)));
}

#[test]
fn free_variables_never_map_to_themselves() {
    // class Wrapper<T> extends Base<T>
    let mut b = SnapshotBuilder::new();
    let object = b.class("java.lang.Object");
    let x = b.type_variable("X");
    let base = b.class("demo.Base");
    b.extends(base, object).declares(base, &[x]);
    let t = b.type_variable("T");
    let base_of_t = b.parameterized(base, &[t]);
    let wrapper = b.class("demo.Wrapper");
    b.extends(wrapper, base_of_t).declares(wrapper, &[t]);

    let sys = b.system();
    for id in [object, base, t, wrapper, base_of_t] {
        let map = sys.type_variable_map(id).unwrap();
        for (key, value) in map.iter() {
            assert!(
                !(value.id == *key && value.depth == 0),
                "type {} maps {} to itself",
                id,
                key
            );
        }
    }
    assert!(sys.type_variable_map(object).unwrap().is_empty());
    assert!(sys.type_variable_map(t).unwrap().is_empty());
    assert_eq!(
        sys.type_variable_map(wrapper).unwrap().get(&x),
        Some(&TypeRef::new(t))
    );
}

#[test]
fn plain_classes_have_empty_maps() {
    let fixture = common::box_fixture();
    let sys = fixture.builder.system();
    for id in [fixture.object, fixture.number, fixture.integer, fixture.string] {
        assert!(sys.type_variable_map(id).unwrap().is_empty());
    }
}

#[test]
fn array_references_render_with_depth() {
    let fixture = common::box_fixture();
    let sys = fixture.builder.system();
    let short = NameOptions::short();
    for (depth, expected) in [(0, "Integer"), (1, "Integer[]"), (3, "Integer[][][]")] {
        let rendered = sys
            .render(TypeRef::array(fixture.integer, depth), &short)
            .unwrap();
        assert_eq!(rendered, expected);
    }
    // equal references share one cache entry
    assert_eq!(
        TypeRef::array(fixture.integer, 2),
        TypeRef::new(fixture.integer).deepen(2)
    );
}
