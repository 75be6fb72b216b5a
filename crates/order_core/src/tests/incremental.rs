use super::*;

fn target_a_items(menus: &Menus) -> (&MenuItem, &MenuItem) {
    let items = &menus[&TargetId::from("A")];
    (&items[0], &items[1])
}

#[test]
fn adds_exactly_one_unit() {
    let (menus, rules) = food_and_drink();
    let (x, _) = target_a_items(&menus);
    let existing = vec![line_for(x, 1)];
    for seed in 0..50 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let selection = add_one_item(&menus, &rules, &existing, &mut rng);
        assert_eq!(selection.units(), 2, "seed {seed}");
        assert!(selection.lines.len() <= existing.len() + 1);
        assert_eq!(selection.steps.len(), 1);
        assert_eq!(selection.lines[0].id, existing[0].id);
        assert!(selection.total_cost <= 200.0);
    }
}

#[test]
fn full_basket_is_returned_verbatim() {
    let (menus, rules) = food_and_drink();
    let (x, _) = target_a_items(&menus);
    let existing = vec![line_for(x, 2)];

    let selection = add_one_item(&menus, &rules, &existing, &mut make_rng());

    assert_eq!(selection.lines, existing);
    assert!(selection.steps.is_empty());
    assert!((selection.total_cost - 200.0).abs() < 1e-9);
    assert_eq!(select(&menus, &rules, Some(&existing), &mut make_rng()), existing);
}

#[test]
fn adds_even_when_basket_is_past_mid() {
    let (menus, rules) = food_and_drink();
    let (_, y) = target_a_items(&menus);
    let existing = vec![line_for(y, 3)];

    let lines = select(&menus, &rules, Some(&existing), &mut make_rng());

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 4);
    assert_eq!(lines[0].id, existing[0].id);
}

#[test]
fn required_item_is_added_first() {
    let (menus, mut rules) = food_and_drink();
    set_item_rule(&mut rules, "A", "x", rule(1.0, Some(1), None));
    let (_, y) = target_a_items(&menus);
    let existing = vec![line_for(y, 1)];
    for seed in 0..20 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let selection = add_one_item(&menus, &rules, &existing, &mut rng);
        assert_eq!(selection.steps[0].kind, StepKind::MinItem);
        assert_eq!(quantity_of(&selection.lines, "x"), 1);
        assert_eq!(selection.lines.len(), 2);
    }
}

#[test]
fn required_category_is_added_before_weighted_fill() {
    let menus = menus_of(vec![item("A", "soup", "Food", 8.0), item("A", "roll", "Bakery", 1.0)]);
    let mut rules = rules_for(&["A"], 0.0, 20.0, 30.0);
    set_category_rule(&mut rules, "A", "Bakery", rule(1.0, Some(1), None));
    let existing = vec![line_for(&menus[&TargetId::from("A")][0], 1)];

    let selection = add_one_item(&menus, &rules, &existing, &mut make_rng());

    assert_eq!(selection.steps[0].kind, StepKind::MinCategory);
    assert_eq!(quantity_of(&selection.lines, "roll"), 1);
}

#[test]
fn existing_lines_count_toward_caps() {
    let (menus, mut rules) = food_and_drink();
    set_item_rule(&mut rules, "A", "x", rule(1.0, None, Some(1)));
    let (x, _) = target_a_items(&menus);
    let existing = vec![line_for(x, 1)];
    for seed in 0..20 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let selection = add_one_item(&menus, &rules, &existing, &mut rng);
        assert_eq!(quantity_of(&selection.lines, "x"), 1);
        assert_eq!(quantity_of(&selection.lines, "y"), 1);
    }
}

#[test]
fn repeated_additions_grow_one_unit_at_a_time() {
    let (menus, rules) = canteen();
    let mut rng = make_rng();
    let mut basket: Vec<OrderLine> = Vec::new();
    loop {
        let before_units: u32 = basket.iter().map(|line| line.quantity).sum();
        let next = select(&menus, &rules, Some(&basket), &mut rng);
        if next == basket {
            break;
        }
        let after_units: u32 = next.iter().map(|line| line.quantity).sum();
        assert_eq!(after_units, before_units + 1);
        assert!(next.len() <= basket.len() + 1);
        assert!(audit_basket(&next, &menus, &rules).is_empty());
        basket = next;
    }
    // Stops only once nothing fits under the ceiling.
    assert!(basket_total(&basket) > 30.0 - 0.8);
}
