//! Modifiers
//!
//! Turns a user's option picks into a validated, priced selection. Picks stay
//! unpriced while the user is still choosing; [`resolve`] materialises implicit
//! defaults and prices the final selection once, at line-creation time.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    catalog::{Catalog, GroupKey, OptionKey},
    tax,
};

/// Errors from modifier selection and resolution.
#[derive(Debug, Error)]
pub enum ModifierError {
    /// The option is inactive and cannot be selected.
    #[error("Option {0} is sold out")]
    OptionSoldOut(String),

    /// The group already holds its maximum number of selections.
    #[error("Modifier group {0} is at capacity")]
    AtCapacity(String),

    /// A required group has too few selections.
    #[error("Modifier group {group} requires at least {min} selection(s)")]
    MissingRequired {
        /// Name of the offending group.
        group: String,

        /// Minimum number of selections the group requires.
        min: usize,
    },

    /// The option is not a visible member of the group.
    #[error("Unknown modifier option")]
    UnknownOption,

    /// The group does not exist or is not attached to the product.
    #[error("Unknown modifier group")]
    UnknownGroup,
}

/// An unpriced option pick: one option chosen within one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pick {
    /// The group the pick belongs to.
    pub group: GroupKey,

    /// The chosen option.
    pub option: OptionKey,
}

/// A priced, resolved modifier choice. One entry per selected option.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedModifier<'a> {
    /// The group the selection belongs to.
    pub group: GroupKey,

    /// The selected option.
    pub option: OptionKey,

    /// Display name of the option.
    pub name: String,

    /// Pre-tax price contribution.
    pub net: Money<'a, Currency>,

    /// VAT contribution.
    pub vat: Money<'a, Currency>,

    /// Tax-inclusive price contribution.
    pub total: Money<'a, Currency>,
}

/// Whether a group already holds its maximum number of explicit picks.
///
/// Unconstrained `(0,0)` groups and single-select `(1,1)` groups are never
/// capacity-limited; the first has no bound, the second replaces on toggle.
#[must_use]
pub fn is_at_capacity(catalog: &Catalog<'_>, group: GroupKey, current: &[Pick]) -> bool {
    let Some(meta) = catalog.group(group) else {
        return false;
    };

    if meta.is_unconstrained() || meta.is_single_select() {
        return false;
    }

    picks_in_group(current, group) >= meta.max
}

/// Whether an option reads as selected, counting the implicit default.
///
/// A group with `min > 0` and a default treats the default as selected until
/// the user picks something in that group. Evaluated on every call; implicit
/// defaults are never written into the pick list by reads.
#[must_use]
pub fn is_selected(
    catalog: &Catalog<'_>,
    group: GroupKey,
    option: OptionKey,
    current: &[Pick],
) -> bool {
    if current
        .iter()
        .any(|pick| pick.group == group && pick.option == option)
    {
        return true;
    }

    let Some(meta) = catalog.group(group) else {
        return false;
    };

    meta.min > 0 && meta.default == Some(option) && picks_in_group(current, group) == 0
}

/// Toggle an option within a group, returning the new pick list.
///
/// Single-select groups replace any existing pick for the group. Multi-select
/// groups add the option when absent and remove it when present.
///
/// # Errors
///
/// - [`ModifierError::UnknownGroup`] when the group does not exist.
/// - [`ModifierError::UnknownOption`] when the option is not a visible member.
/// - [`ModifierError::OptionSoldOut`] when selecting an inactive option.
/// - [`ModifierError::AtCapacity`] when the group already holds `max` picks.
pub fn toggle(
    catalog: &Catalog<'_>,
    group: GroupKey,
    option: OptionKey,
    current: &[Pick],
) -> Result<SmallVec<[Pick; 4]>, ModifierError> {
    let meta = catalog.group(group).ok_or(ModifierError::UnknownGroup)?;

    if !meta.is_member(option) {
        return Err(ModifierError::UnknownOption);
    }

    let already_picked = current
        .iter()
        .any(|pick| pick.group == group && pick.option == option);

    // Deselection never needs the option to still be active.
    if already_picked && !meta.is_single_select() {
        let next = current
            .iter()
            .copied()
            .filter(|pick| !(pick.group == group && pick.option == option))
            .collect();

        return Ok(next);
    }

    let details = catalog.option(option).ok_or(ModifierError::UnknownOption)?;

    if !details.active {
        return Err(ModifierError::OptionSoldOut(details.name.clone()));
    }

    if meta.is_single_select() {
        let mut next: SmallVec<[Pick; 4]> = current
            .iter()
            .copied()
            .filter(|pick| pick.group != group)
            .collect();

        next.push(Pick { group, option });

        return Ok(next);
    }

    if is_at_capacity(catalog, group, current) {
        return Err(ModifierError::AtCapacity(meta.name.clone()));
    }

    let mut next: SmallVec<[Pick; 4]> = current.iter().copied().collect();
    next.push(Pick { group, option });

    Ok(next)
}

/// Expand picks with implicit defaults, ordered by the product's group order.
///
/// Recomputed on every call; defaults are materialised into the result, never
/// written back into `current`.
#[must_use]
pub fn effective_picks(
    catalog: &Catalog<'_>,
    groups: &[GroupKey],
    current: &[Pick],
) -> SmallVec<[Pick; 4]> {
    let mut out: SmallVec<[Pick; 4]> = SmallVec::new();

    for &group in groups {
        let Some(meta) = catalog.group(group) else {
            continue;
        };

        let before = out.len();
        out.extend(current.iter().copied().filter(|pick| pick.group == group));

        if out.len() == before
            && meta.min > 0
            && let Some(default) = meta.default
            && meta.is_member(default)
        {
            out.push(Pick {
                group,
                option: default,
            });
        }
    }

    out
}

/// Check every required group holds at least `min` selections.
///
/// Implicit defaults count towards the minimum.
///
/// # Errors
///
/// - [`ModifierError::UnknownGroup`] when a group key does not resolve.
/// - [`ModifierError::MissingRequired`] naming the first under-filled group.
pub fn validate(
    catalog: &Catalog<'_>,
    groups: &[GroupKey],
    current: &[Pick],
) -> Result<(), ModifierError> {
    for &group in groups {
        let meta = catalog.group(group).ok_or(ModifierError::UnknownGroup)?;

        if meta.min == 0 {
            continue;
        }

        let mut count = picks_in_group(current, group);

        if count == 0
            && let Some(default) = meta.default
            && meta.is_member(default)
        {
            count = 1;
        }

        if count < meta.min {
            return Err(ModifierError::MissingRequired {
                group: meta.name.clone(),
                min: meta.min,
            });
        }
    }

    Ok(())
}

/// Validate and price the final selection for a product's groups.
///
/// Implicit defaults are materialised here; each selection is priced from the
/// option's own tax rate via [`tax::breakdown`].
///
/// # Errors
///
/// - [`ModifierError::UnknownGroup`] when a pick references a group not
///   attached to the product, or a group key does not resolve.
/// - [`ModifierError::MissingRequired`] when a required group is under-filled.
/// - [`ModifierError::AtCapacity`] when a bounded group holds more than `max`
///   explicit picks.
/// - [`ModifierError::UnknownOption`] / [`ModifierError::OptionSoldOut`] for
///   picks of hidden or inactive options.
pub fn resolve<'a>(
    catalog: &Catalog<'a>,
    groups: &[GroupKey],
    current: &[Pick],
) -> Result<SmallVec<[SelectedModifier<'a>; 4]>, ModifierError> {
    for pick in current {
        if !groups.contains(&pick.group) {
            return Err(ModifierError::UnknownGroup);
        }
    }

    validate(catalog, groups, current)?;

    for &group in groups {
        let meta = catalog.group(group).ok_or(ModifierError::UnknownGroup)?;

        if !meta.is_unconstrained()
            && !meta.is_single_select()
            && picks_in_group(current, group) > meta.max
        {
            return Err(ModifierError::AtCapacity(meta.name.clone()));
        }
    }

    let picks = effective_picks(catalog, groups, current);
    let mut selection: SmallVec<[SelectedModifier<'a>; 4]> = SmallVec::new();

    for pick in picks {
        let meta = catalog.group(pick.group).ok_or(ModifierError::UnknownGroup)?;

        if !meta.is_member(pick.option) {
            return Err(ModifierError::UnknownOption);
        }

        let details = catalog
            .option(pick.option)
            .ok_or(ModifierError::UnknownOption)?;

        if !details.active {
            return Err(ModifierError::OptionSoldOut(details.name.clone()));
        }

        let parts = tax::breakdown(&details.price, details.tax);

        selection.push(SelectedModifier {
            group: pick.group,
            option: pick.option,
            name: details.name.clone(),
            net: parts.net,
            vat: parts.vat,
            total: details.price,
        });
    }

    Ok(selection)
}

/// Count explicit picks belonging to a group.
fn picks_in_group(current: &[Pick], group: GroupKey) -> usize {
    current.iter().filter(|pick| pick.group == group).count()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rustc_hash::FxHashSet;
    use rusty_money::iso::GBP;
    use smallvec::smallvec;
    use testresult::TestResult;

    use crate::{
        catalog::{ModifierGroup, ModifierOption},
        tax::TaxRate,
    };

    use super::*;

    struct MilkGroup {
        catalog: Catalog<'static>,
        group: GroupKey,
        whole: OptionKey,
        oat: OptionKey,
        soy: OptionKey,
    }

    fn option(name: &str, minor: i64, active: bool) -> ModifierOption<'static> {
        ModifierOption {
            name: name.to_string(),
            price: Money::from_minor(minor, GBP),
            tax: TaxRate::from_percent(Decimal::from(20)),
            active,
        }
    }

    fn milk_group(min: usize, max: usize, with_default: bool) -> MilkGroup {
        let mut catalog = Catalog::new();

        let whole = catalog.insert_option(option("Whole", 0, true));
        let oat = catalog.insert_option(option("Oat", 40, true));
        let soy = catalog.insert_option(option("Soy", 40, false));

        let group = catalog.insert_group(ModifierGroup {
            name: "Milk".to_string(),
            min,
            max,
            default: with_default.then_some(whole),
            excluded: FxHashSet::default(),
            options: smallvec![whole, oat, soy],
        });

        MilkGroup {
            catalog,
            group,
            whole,
            oat,
            soy,
        }
    }

    #[test]
    fn single_select_toggle_replaces_prior_pick() -> TestResult {
        let milk = milk_group(1, 1, true);

        let picks = toggle(&milk.catalog, milk.group, milk.whole, &[])?;
        let picks = toggle(&milk.catalog, milk.group, milk.oat, &picks)?;

        assert_eq!(picks.len(), 1);
        assert_eq!(
            picks.first().copied(),
            Some(Pick {
                group: milk.group,
                option: milk.oat
            })
        );

        Ok(())
    }

    #[test]
    fn multi_select_toggle_adds_then_removes() -> TestResult {
        let milk = milk_group(0, 2, false);

        let picks = toggle(&milk.catalog, milk.group, milk.oat, &[])?;
        assert_eq!(picks.len(), 1);

        let picks = toggle(&milk.catalog, milk.group, milk.oat, &picks)?;
        assert!(picks.is_empty());

        Ok(())
    }

    #[test]
    fn toggle_beyond_capacity_is_rejected() -> TestResult {
        let milk = milk_group(0, 1, false);

        let picks = toggle(&milk.catalog, milk.group, milk.whole, &[])?;
        let result = toggle(&milk.catalog, milk.group, milk.oat, &picks);

        assert!(matches!(result, Err(ModifierError::AtCapacity(name)) if name == "Milk"));

        Ok(())
    }

    #[test]
    fn capacity_exempts_unconstrained_and_single_select() -> TestResult {
        let unconstrained = milk_group(0, 0, false);
        let single = milk_group(1, 1, false);

        let picks = toggle(
            &unconstrained.catalog,
            unconstrained.group,
            unconstrained.whole,
            &[],
        )?;

        assert!(!is_at_capacity(
            &unconstrained.catalog,
            unconstrained.group,
            &picks
        ));

        let picks = toggle(&single.catalog, single.group, single.whole, &[])?;

        assert!(!is_at_capacity(&single.catalog, single.group, &picks));

        Ok(())
    }

    #[test]
    fn selecting_inactive_option_is_sold_out() {
        let milk = milk_group(0, 2, false);

        let result = toggle(&milk.catalog, milk.group, milk.soy, &[]);

        assert!(matches!(result, Err(ModifierError::OptionSoldOut(name)) if name == "Soy"));
    }

    #[test]
    fn deselecting_inactive_option_still_works() -> TestResult {
        let milk = milk_group(0, 2, false);

        // A pick made before the option went inactive can still be removed.
        let stale = [Pick {
            group: milk.group,
            option: milk.soy,
        }];

        let picks = toggle(&milk.catalog, milk.group, milk.soy, &stale)?;

        assert!(picks.is_empty());

        Ok(())
    }

    #[test]
    fn excluded_option_is_not_selectable() {
        let mut catalog = Catalog::new();

        let oat = catalog.insert_option(option("Oat", 40, true));
        let coconut = catalog.insert_option(option("Coconut", 40, true));

        let mut excluded = FxHashSet::default();
        excluded.insert(coconut);

        let group = catalog.insert_group(ModifierGroup {
            name: "Milk".to_string(),
            min: 0,
            max: 2,
            default: None,
            excluded,
            options: smallvec![oat, coconut],
        });

        let result = toggle(&catalog, group, coconut, &[]);

        assert!(matches!(result, Err(ModifierError::UnknownOption)));
    }

    #[test]
    fn unlisted_option_is_not_selectable() {
        let mut milk = milk_group(0, 2, false);

        let extra = milk.catalog.insert_option(option("Coconut", 40, true));
        let result = toggle(&milk.catalog, milk.group, extra, &[]);

        assert!(matches!(result, Err(ModifierError::UnknownOption)));
    }

    #[test]
    fn default_reads_as_selected_until_user_picks() {
        let milk = milk_group(1, 1, true);

        assert!(is_selected(&milk.catalog, milk.group, milk.whole, &[]));
        assert!(!is_selected(&milk.catalog, milk.group, milk.oat, &[]));
        assert!(!is_selected(&milk.catalog, milk.group, milk.soy, &[]));

        let picks = [Pick {
            group: milk.group,
            option: milk.oat,
        }];

        assert!(!is_selected(&milk.catalog, milk.group, milk.whole, &picks));
        assert!(is_selected(&milk.catalog, milk.group, milk.oat, &picks));
    }

    #[test]
    fn validate_counts_implicit_default() -> TestResult {
        let milk = milk_group(1, 1, true);

        validate(&milk.catalog, &[milk.group], &[])?;

        Ok(())
    }

    #[test]
    fn validate_rejects_missing_required_group() {
        let milk = milk_group(1, 1, false);

        let result = validate(&milk.catalog, &[milk.group], &[]);

        assert!(matches!(
            result,
            Err(ModifierError::MissingRequired { group, min: 1 }) if group == "Milk"
        ));
    }

    #[test]
    fn resolve_materialises_default_and_prices_it() -> TestResult {
        let milk = milk_group(1, 1, true);

        let selection = resolve(&milk.catalog, &[milk.group], &[])?;

        assert_eq!(selection.len(), 1);

        let selected = selection.first().ok_or("missing selection")?;

        assert_eq!(selected.option, milk.whole);
        assert_eq!(selected.total, Money::from_minor(0, GBP));

        Ok(())
    }

    #[test]
    fn resolve_prices_each_option_with_its_own_rate() -> TestResult {
        let milk = milk_group(0, 2, false);

        let picks = [Pick {
            group: milk.group,
            option: milk.oat,
        }];

        let selection = resolve(&milk.catalog, &[milk.group], &picks)?;
        let selected = selection.first().ok_or("missing selection")?;

        // 0.40 gross at 20%: net 0.33, VAT 0.07.
        assert_eq!(selected.net, Money::from_minor(33, GBP));
        assert_eq!(selected.vat, Money::from_minor(7, GBP));
        assert_eq!(selected.total, Money::from_minor(40, GBP));

        Ok(())
    }

    #[test]
    fn resolve_rejects_pick_for_unattached_group() {
        let mut milk = milk_group(0, 2, false);

        let syrups = milk.catalog.insert_group(ModifierGroup {
            name: "Syrups".to_string(),
            min: 0,
            max: 2,
            default: None,
            excluded: FxHashSet::default(),
            options: SmallVec::new(),
        });

        let picks = [Pick {
            group: syrups,
            option: milk.whole,
        }];

        let result = resolve(&milk.catalog, &[milk.group], &picks);

        assert!(matches!(result, Err(ModifierError::UnknownGroup)));
    }

    #[test]
    fn resolve_rejects_over_capacity_selection() {
        let milk = milk_group(0, 1, false);

        let picks = [
            Pick {
                group: milk.group,
                option: milk.whole,
            },
            Pick {
                group: milk.group,
                option: milk.oat,
            },
        ];

        let result = resolve(&milk.catalog, &[milk.group], &picks);

        assert!(matches!(result, Err(ModifierError::AtCapacity(_))));
    }

    #[test]
    fn resolve_rejects_inactive_default() {
        let mut catalog = Catalog::new();

        let soy = catalog.insert_option(option("Soy", 40, false));

        let group = catalog.insert_group(ModifierGroup {
            name: "Milk".to_string(),
            min: 1,
            max: 1,
            default: Some(soy),
            excluded: FxHashSet::default(),
            options: smallvec![soy],
        });

        let result = resolve(&catalog, &[group], &[]);

        assert!(matches!(result, Err(ModifierError::OptionSoldOut(_))));
    }
}
