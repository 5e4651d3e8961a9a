//! Catalog
//!
//! Read-only product, category and modifier data the cart engine resolves
//! against. The engine never writes back to the catalog.

use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::tax::TaxRate;

new_key_type! {
    /// Category key
    pub struct CategoryKey;
}

new_key_type! {
    /// Product key
    pub struct ProductKey;
}

new_key_type! {
    /// Modifier group key
    pub struct GroupKey;
}

new_key_type! {
    /// Modifier option key
    pub struct OptionKey;
}

/// How a product is counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    /// Sold in whole items.
    PerItem,

    /// Sold by a measured unit (weight, volume, length).
    Measured(String),
}

/// The shape a cart line takes for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// A single item.
    Item,

    /// A box of items.
    Box,

    /// A crate of boxes.
    Crate,
}

/// A product category.
#[derive(Debug, Clone)]
pub struct Category {
    /// Display name.
    pub name: String,
}

/// A sellable product with a tax-inclusive price.
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Stock-keeping unit; the identity key for line merging.
    pub sku: String,

    /// Display name.
    pub name: String,

    /// Tax-inclusive price.
    pub price: Money<'a, Currency>,

    /// VAT rate applied to the price.
    pub tax: TaxRate,

    /// Category, when the product belongs to one.
    pub category: Option<CategoryKey>,

    /// Modifier groups attached to the product, in display order.
    pub groups: SmallVec<[GroupKey; 4]>,

    /// How the product is counted.
    pub unit: Unit,

    /// The shape a cart line takes.
    pub kind: LineKind,

    /// Whether the price is entered at the till rather than fixed here.
    pub open_price: bool,

    /// Whether the product can currently be sold.
    pub active: bool,
}

/// A selectable option within a modifier group.
#[derive(Debug, Clone)]
pub struct ModifierOption<'a> {
    /// Display name.
    pub name: String,

    /// Tax-inclusive price contribution.
    pub price: Money<'a, Currency>,

    /// VAT rate applied to the price contribution.
    pub tax: TaxRate,

    /// Whether the option can currently be selected.
    pub active: bool,
}

/// A named set of selectable options with selection-count bounds.
///
/// Invariant: `min <= max` unless both are zero, in which case the group is
/// unconstrained. A `min == 1 && max == 1` group is single-select and
/// auto-selects `default` while the user has made no explicit pick.
#[derive(Debug, Clone)]
pub struct ModifierGroup {
    /// Display name.
    pub name: String,

    /// Minimum number of selections required at commit.
    pub min: usize,

    /// Maximum number of selections the group holds.
    pub max: usize,

    /// Option selected implicitly while the group has no explicit pick.
    pub default: Option<OptionKey>,

    /// Options hidden from this group entirely.
    pub excluded: FxHashSet<OptionKey>,

    /// Member options, in display order.
    pub options: SmallVec<[OptionKey; 8]>,
}

impl ModifierGroup {
    /// Whether the group is single-select (radio) shaped.
    #[must_use]
    pub fn is_single_select(&self) -> bool {
        self.min == 1 && self.max == 1
    }

    /// Whether the group carries no selection constraints at all.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.min == 0 && self.max == 0
    }

    /// Whether the option is a visible member of this group.
    #[must_use]
    pub fn is_member(&self, option: OptionKey) -> bool {
        self.options.contains(&option) && !self.excluded.contains(&option)
    }
}

/// The catalog read model: arenas for categories, products, modifier groups
/// and options.
#[derive(Debug, Default)]
pub struct Catalog<'a> {
    categories: SlotMap<CategoryKey, Category>,
    products: SlotMap<ProductKey, Product<'a>>,
    groups: SlotMap<GroupKey, ModifierGroup>,
    options: SlotMap<OptionKey, ModifierOption<'a>>,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            categories: SlotMap::with_key(),
            products: SlotMap::with_key(),
            groups: SlotMap::with_key(),
            options: SlotMap::with_key(),
        }
    }

    /// Insert a category and return its key.
    pub fn insert_category(&mut self, category: Category) -> CategoryKey {
        self.categories.insert(category)
    }

    /// Insert a product and return its key.
    pub fn insert_product(&mut self, product: Product<'a>) -> ProductKey {
        self.products.insert(product)
    }

    /// Insert a modifier group and return its key.
    pub fn insert_group(&mut self, group: ModifierGroup) -> GroupKey {
        self.groups.insert(group)
    }

    /// Insert a modifier option and return its key.
    pub fn insert_option(&mut self, option: ModifierOption<'a>) -> OptionKey {
        self.options.insert(option)
    }

    /// Look up a category.
    #[must_use]
    pub fn category(&self, key: CategoryKey) -> Option<&Category> {
        self.categories.get(key)
    }

    /// Look up a product.
    #[must_use]
    pub fn product(&self, key: ProductKey) -> Option<&Product<'a>> {
        self.products.get(key)
    }

    /// Look up a modifier group.
    #[must_use]
    pub fn group(&self, key: GroupKey) -> Option<&ModifierGroup> {
        self.groups.get(key)
    }

    /// Look up a modifier option.
    #[must_use]
    pub fn option(&self, key: OptionKey) -> Option<&ModifierOption<'a>> {
        self.options.get(key)
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.products.len()
    }
}
