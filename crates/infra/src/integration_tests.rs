//! Integration tests for the line item → invoice cascade.
//!
//! Tests: LineItemService → LineItemStore → EventDispatcher → InvoiceRecalculation → InvoiceStore
//!
//! Verifies:
//! - Saving or deleting a line item leaves its invoice with fresh totals
//! - Invalid line items are rejected before anything is written
//! - Variants resolve through the registry, including stored ones

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use memberbill_core::{AggregateRoot, DomainError, Money, RoundingIncrement};
    use memberbill_events::EventDispatcher;
    use memberbill_invoicing::{
        CostParameters, DynamicCost, Invoice, LineItem, LineItemKind, LineItemService,
        LineItemStore, VariantRegistry, VatRate,
    };

    use crate::billing::Billing;
    use crate::config::BillingConfig;
    use crate::store::InMemoryLineItemStore;

    /// Camp fee: `participants × nights × rate_per_night`.
    struct CampFee;

    impl DynamicCost for CampFee {
        fn discriminator(&self) -> &'static str {
            "InvoiceItem::CampFee"
        }

        fn parameter_keys(&self) -> &'static [&'static str] {
            &["participants", "nights", "rate_per_night"]
        }

        fn compute_cost(&self, parameters: &CostParameters) -> Money {
            let inputs = (
                parameters.decimal("participants"),
                parameters.decimal("nights"),
                parameters.decimal("rate_per_night"),
            );
            match inputs {
                (Some(participants), Some(nights), Some(rate)) => {
                    Money::new(participants * nights * rate)
                }
                _ => Money::ZERO,
            }
        }
    }

    fn registry() -> VariantRegistry {
        VariantRegistry::new()
            .with(Arc::new(CampFee))
            .expect("camp fee registers once")
    }

    fn setup() -> Billing {
        memberbill_observability::init();
        Billing::in_memory(BillingConfig::default(), registry())
    }

    fn static_item(billing: &Billing, invoice: &Invoice, name: &str, unit_cost: Decimal) -> LineItem {
        billing
            .line_items()
            .build(invoice.id_typed(), "InvoiceItem", name)
            .unwrap()
            .with_unit_cost(Money::new(unit_cost))
    }

    #[test]
    fn saving_a_line_item_recalculates_its_invoice() {
        let billing = setup();
        let invoice = billing.open_invoice("Jahresbeitrag 2026").unwrap();
        assert_eq!(invoice.version(), 1);

        let mut item = static_item(&billing, &invoice, "Kurs", dec!(9.90))
            .with_count(3)
            .with_vat_rate(VatRate::new(dec!(7.7)));
        billing.line_items().recalculate_and_persist(&mut item).unwrap();

        assert_eq!(item.cost(), Some(Money::new(dec!(29.70))));
        assert_eq!(item.vat(), Money::new(dec!(2.2869)));
        assert_eq!(item.total(), Money::new(dec!(31.9869)));

        let invoice = billing.invoice(invoice.id_typed()).unwrap();
        assert_eq!(invoice.total(), Money::new(dec!(31.99)));
        assert_eq!(invoice.totals().vat, Money::new(dec!(2.29)));
        assert_eq!(invoice.version(), 2);
        assert!(invoice.recalculated_at().is_some());
    }

    #[test]
    fn editing_a_line_item_updates_the_invoice() {
        let billing = setup();
        let invoice = billing.open_invoice("Lager").unwrap();

        let mut item = static_item(&billing, &invoice, "Beitrag", dec!(40));
        billing.line_items().recalculate_and_persist(&mut item).unwrap();
        assert_eq!(billing.invoice(invoice.id_typed()).unwrap().total(), Money::new(dec!(40)));

        item.count = Some(2);
        billing.line_items().recalculate_and_persist(&mut item).unwrap();

        let stored = billing.line_items().get(item.id_typed()).unwrap();
        assert_eq!(stored.cost(), Some(Money::new(dec!(80))));
        assert_eq!(billing.invoice(invoice.id_typed()).unwrap().total(), Money::new(dec!(80)));
    }

    #[test]
    fn deleting_a_line_item_drops_it_from_the_invoice_total() {
        let billing = setup();
        let invoice = billing.open_invoice("Mitgliederbeitrag").unwrap();

        let mut first = static_item(&billing, &invoice, "Aktivmitglied", dec!(100));
        let mut second = static_item(&billing, &invoice, "Passivmitglied", dec!(50));
        billing.line_items().recalculate_and_persist(&mut first).unwrap();
        billing.line_items().recalculate_and_persist(&mut second).unwrap();
        assert_eq!(billing.invoice(invoice.id_typed()).unwrap().total(), Money::new(dec!(150)));

        let removed = billing.line_items().delete(second.id_typed()).unwrap();
        assert_eq!(removed.name, "Passivmitglied");

        let invoice = billing.invoice(invoice.id_typed()).unwrap();
        assert_eq!(invoice.total(), Money::new(dec!(100)));
        assert_eq!(billing.line_items().list(invoice.id_typed()).unwrap().len(), 1);
    }

    #[test]
    fn invalid_line_items_leave_the_invoice_untouched() {
        let billing = setup();
        let invoice = billing.open_invoice("Entwurf").unwrap();

        let mut unpriced = billing
            .line_items()
            .build(invoice.id_typed(), "InvoiceItem", "Ohne Preis")
            .unwrap();
        let err = billing
            .line_items()
            .recalculate_and_persist(&mut unpriced)
            .unwrap_err();
        assert_eq!(err, DomainError::validation("unit_cost must be present"));

        let mut bad_vat = static_item(&billing, &invoice, "Falsche MWST", dec!(10))
            .with_vat_rate(VatRate::new(dec!(150)));
        assert!(
            billing
                .line_items()
                .recalculate_and_persist(&mut bad_vat)
                .unwrap_err()
                .is_validation()
        );

        assert!(billing.line_items().list(invoice.id_typed()).unwrap().is_empty());
        assert_eq!(billing.invoice(invoice.id_typed()).unwrap(), invoice);
    }

    #[test]
    fn oversized_unit_cost_is_a_validation_error() {
        let billing = setup();
        let invoice = billing.open_invoice("Grossbetrag").unwrap();

        let mut big = static_item(&billing, &invoice, "Big", Decimal::MAX).with_count(2);
        let err = billing.line_items().recalculate_and_persist(&mut big).unwrap_err();

        assert_eq!(err, DomainError::validation("unit_cost is too large"));
        assert!(billing.line_items().list(invoice.id_typed()).unwrap().is_empty());
        assert_eq!(billing.invoice(invoice.id_typed()).unwrap(), invoice);
    }

    #[test]
    fn oversized_dynamic_cost_is_a_validation_error() {
        let billing = setup();
        let invoice = billing.open_invoice("Riesenlager").unwrap();

        let params = CostParameters::new()
            .with("participants", json!(1_000_000))
            .with("nights", json!(1_000_000))
            .with("rate_per_night", json!(1_000_000));
        let mut camp = billing
            .line_items()
            .build(invoice.id_typed(), "InvoiceItem::CampFee", "Lager")
            .unwrap()
            .with_parameters(&params);

        let err = billing.line_items().recalculate_and_persist(&mut camp).unwrap_err();
        assert_eq!(err, DomainError::validation("cost is too large"));
        assert!(billing.line_items().list(invoice.id_typed()).unwrap().is_empty());
    }

    #[test]
    fn moving_a_line_item_recalculates_both_invoices() {
        let billing = setup();
        let first = billing.open_invoice("Januar").unwrap();
        let second = billing.open_invoice("Februar").unwrap();

        let mut item = static_item(&billing, &first, "Beitrag", dec!(60));
        billing.line_items().recalculate_and_persist(&mut item).unwrap();
        assert_eq!(billing.invoice(first.id_typed()).unwrap().total(), Money::new(dec!(60)));

        let mut moved = static_item(&billing, &second, "Beitrag", dec!(60)).with_id(item.id_typed());
        billing.line_items().recalculate_and_persist(&mut moved).unwrap();

        assert_eq!(billing.invoice(first.id_typed()).unwrap().total(), Money::ZERO);
        assert_eq!(billing.invoice(second.id_typed()).unwrap().total(), Money::new(dec!(60)));
        assert!(billing.line_items().list(first.id_typed()).unwrap().is_empty());
        assert_eq!(billing.line_items().list(second.id_typed()).unwrap().len(), 1);
    }

    #[test]
    fn line_items_are_listed_by_name() {
        let billing = setup();
        let invoice = billing.open_invoice("Sortierung").unwrap();
        for name in ["Zelt", "Anmeldung", "Material"] {
            let mut item = static_item(&billing, &invoice, name, dec!(1));
            billing.line_items().recalculate_and_persist(&mut item).unwrap();
        }

        let names: Vec<String> = billing
            .line_items()
            .list(invoice.id_typed())
            .unwrap()
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, vec!["Anmeldung", "Material", "Zelt"]);
    }

    #[test]
    fn dynamic_variants_cost_from_their_parameters() {
        let billing = setup();
        let invoice = billing.open_invoice("Sommerlager").unwrap();

        let params = CostParameters::new()
            .with("participants", json!(12))
            .with("nights", json!(5))
            .with("rate_per_night", "8.50")
            .with("discount", json!(100));
        let mut camp = billing
            .line_items()
            .build(invoice.id_typed(), "InvoiceItem::CampFee", "Lagerbeitrag")
            .unwrap()
            .with_parameters(&params)
            .with_vat_rate(VatRate::new(dec!(2.6)));
        camp.count = None;

        billing.line_items().recalculate_and_persist(&mut camp).unwrap();

        assert!(camp.dynamic_cost_parameters.get("discount").is_none());
        assert_eq!(camp.cost(), Some(Money::new(dec!(510.00))));
        assert_eq!(camp.vat(), Money::new(dec!(13.26)));
        assert_eq!(
            billing.invoice(invoice.id_typed()).unwrap().total(),
            Money::new(dec!(523.26))
        );
    }

    #[test]
    fn cash_rounding_config_rounds_invoice_totals() {
        memberbill_observability::init();
        let config = BillingConfig {
            total_rounding: RoundingIncrement::new(dec!(0.05)).unwrap(),
            ..BillingConfig::default()
        };
        let billing = Billing::in_memory(config, VariantRegistry::new());
        let invoice = billing.open_invoice("Bar").unwrap();

        let mut item = static_item(&billing, &invoice, "Kurs", dec!(9.90))
            .with_count(3)
            .with_vat_rate(VatRate::new(dec!(7.7)));
        billing.line_items().recalculate_and_persist(&mut item).unwrap();

        assert_eq!(billing.invoice(invoice.id_typed()).unwrap().total(), Money::new(dec!(32.00)));
    }

    #[test]
    fn variant_lookup_by_discriminator() {
        let billing = setup();

        assert_eq!(
            billing.line_items().find_variant("InvoiceItem").unwrap(),
            LineItemKind::Static
        );
        assert!(billing.line_items().find_variant("InvoiceItem::CampFee").unwrap().is_dynamic());

        let err = billing.line_items().find_variant("Nonexistent").unwrap_err();
        assert_eq!(err, DomainError::not_found("No invoice_item type 'Nonexistent' found"));
    }

    #[test]
    fn deleting_an_unknown_line_item_is_not_found() {
        let billing = setup();
        let invoice = billing.open_invoice("Leer").unwrap();
        let item = static_item(&billing, &invoice, "Nie gespeichert", dec!(1));

        assert!(billing.line_items().delete(item.id_typed()).unwrap_err().is_not_found());
    }

    #[test]
    fn saving_against_a_missing_invoice_surfaces_not_found() {
        let billing = setup();
        let orphan_invoice = Invoice::new(
            memberbill_invoicing::InvoiceId::new(memberbill_core::AggregateId::new()),
            "Nicht gespeichert",
        );
        let mut item = static_item(&billing, &orphan_invoice, "Waise", dec!(5));

        let err = billing.line_items().recalculate_and_persist(&mut item).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn stored_variants_must_be_registered() {
        memberbill_observability::init();
        let store = Arc::new(InMemoryLineItemStore::new());
        let invoice = Invoice::new(
            memberbill_invoicing::InvoiceId::new(memberbill_core::AggregateId::new()),
            "Altbestand",
        );
        let camp = LineItem::new(invoice.id_typed(), LineItemKind::Dynamic(Arc::new(CampFee)), "Lager");
        store.save(camp).unwrap();

        let known = LineItemService::new(
            store.clone(),
            Arc::new(registry()),
            Arc::new(EventDispatcher::new()),
        );
        let kinds = known.stored_variants().unwrap();
        assert_eq!(kinds.len(), 1);
        assert_eq!(kinds[0].discriminator(), "InvoiceItem::CampFee");

        let unaware = LineItemService::new(
            store,
            Arc::new(VariantRegistry::new()),
            Arc::new(EventDispatcher::new()),
        );
        assert!(unaware.stored_variants().unwrap_err().is_not_found());
    }
}
