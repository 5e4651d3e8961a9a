//! Fixtures

use std::{fs, path::PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};
use rusty_money::{Money, iso::Currency};
use slotmap::SlotMap;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    cart::CartAggregate,
    catalog::{
        Catalog, Category, CategoryKey, GroupKey, ModifierGroup, ModifierOption, OptionKey,
        Product, ProductKey,
    },
    discounts::{Coupon, DiscountKey, DiscountValue},
    fixtures::{catalog::CatalogFixture, promotions::PromotionsFixture},
    promotions::{
        Condition, FreeItem, OfferCap, Promotion, PromotionKey, PromotionRule, Reward, Target,
    },
    tax::TaxRate,
};

pub mod catalog;
pub mod promotions;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Invalid tax rate format
    #[error("Invalid tax rate format: {0}")]
    InvalidTaxRate(String),

    /// Invalid product data
    #[error("Invalid product data: {0}")]
    InvalidProductData(String),

    /// Invalid promotion data
    #[error("Invalid promotion data: {0}")]
    InvalidPromotionData(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Category not found
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Modifier group not found
    #[error("Modifier group not found: {0}")]
    GroupNotFound(String),

    /// Modifier option not found
    #[error("Modifier option not found: {0}")]
    OptionNotFound(String),

    /// Coupon not found
    #[error("Coupon not found: {0}")]
    CouponNotFound(String),

    /// Promotion not found
    #[error("Promotion not found: {0}")]
    PromotionNotFound(String),

    /// Currency mismatch between fixture prices
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No prices loaded yet
    #[error("No prices loaded yet; currency unknown")]
    NoCurrency,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// The catalog built from the loaded files
    catalog: Catalog<'a>,

    /// String key -> catalog key mappings for lookups
    category_keys: FxHashMap<String, CategoryKey>,
    product_keys: FxHashMap<String, ProductKey>,
    group_keys: FxHashMap<String, GroupKey>,
    option_keys: FxHashMap<String, OptionKey>,

    /// Key mints for coupons and promotions
    coupon_slots: SlotMap<DiscountKey, ()>,
    promotion_slots: SlotMap<PromotionKey, ()>,

    /// String key -> minted key mappings for lookups
    coupon_keys: FxHashMap<String, DiscountKey>,
    promotion_keys: FxHashMap<String, PromotionKey>,

    /// Pre-built coupons and promotions
    coupons: Vec<Coupon<'a>>,
    promotions: Vec<Promotion<'a>>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: Catalog::new(),
            category_keys: FxHashMap::default(),
            product_keys: FxHashMap::default(),
            group_keys: FxHashMap::default(),
            option_keys: FxHashMap::default(),
            coupon_slots: SlotMap::with_key(),
            promotion_slots: SlotMap::with_key(),
            coupon_keys: FxHashMap::default(),
            promotion_keys: FxHashMap::default(),
            coupons: Vec::new(),
            promotions: Vec::new(),
            currency: None,
        }
    }

    /// Load categories, modifier groups and products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if a product
    /// references an unknown category or group, or if prices mix currencies.
    pub fn load_catalog(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("catalog").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CatalogFixture = serde_norway::from_str(&contents)?;

        for (key, category) in fixture.categories {
            let category_key = self.catalog.insert_category(Category {
                name: category.name,
            });

            self.category_keys.insert(key, category_key);
        }

        for (key, group) in fixture.groups {
            self.load_group(&key, group)?;
        }

        for (key, product) in fixture.products {
            self.load_product(key, product)?;
        }

        Ok(self)
    }

    /// Load coupons and promotions from a YAML fixture file
    ///
    /// Amount-valued entries need the catalog currency, so load the catalog
    /// first when the file carries any.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if an entry
    /// references unknown catalog keys.
    pub fn load_promotions(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self
            .base_path
            .join("promotions")
            .join(format!("{name}.yml"));

        let contents = fs::read_to_string(&file_path)?;
        let fixture: PromotionsFixture = serde_norway::from_str(&contents)?;

        for (key, coupon) in fixture.coupons {
            let coupon_key = self.coupon_slots.insert(());
            let value = self.build_discount(&coupon.discount)?;

            self.coupons.push(Coupon {
                key: coupon_key,
                code: coupon.code,
                value,
                expiry: coupon.expires,
            });

            self.coupon_keys.insert(key, coupon_key);
        }

        for (key, promotion) in fixture.promotions {
            let promotion_key = self.promotion_slots.insert(());
            let built = self.build_promotion(promotion_key, promotion)?;

            self.promotions.push(built);
            self.promotion_keys.insert(key, promotion_key);
        }

        Ok(self)
    }

    /// Load a complete fixture set (catalog and promotions with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if either fixture file cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_catalog(name)?.load_promotions(name)?;

        Ok(fixture)
    }

    /// Get the catalog
    #[must_use]
    pub fn catalog(&self) -> &Catalog<'a> {
        &self.catalog
    }

    /// Get a product by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&Product<'a>, FixtureError> {
        let product_key = self.product_key(key)?;

        self.catalog
            .product(product_key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get a product key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product_key(&self, key: &str) -> Result<ProductKey, FixtureError> {
        self.product_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get a category key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the category is not found.
    pub fn category_key(&self, key: &str) -> Result<CategoryKey, FixtureError> {
        self.category_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::CategoryNotFound(key.to_string()))
    }

    /// Get a modifier group key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the group is not found.
    pub fn group_key(&self, key: &str) -> Result<GroupKey, FixtureError> {
        self.group_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::GroupNotFound(key.to_string()))
    }

    /// Get a modifier option key by its dotted string key (e.g. "milk.oat")
    ///
    /// # Errors
    ///
    /// Returns an error if the option is not found.
    pub fn option_key(&self, key: &str) -> Result<OptionKey, FixtureError> {
        self.option_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::OptionNotFound(key.to_string()))
    }

    /// Get a coupon by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the coupon is not found.
    pub fn coupon(&self, key: &str) -> Result<&Coupon<'a>, FixtureError> {
        let coupon_key = self
            .coupon_keys
            .get(key)
            .ok_or_else(|| FixtureError::CouponNotFound(key.to_string()))?;

        self.coupons
            .iter()
            .find(|coupon| coupon.key == *coupon_key)
            .ok_or_else(|| FixtureError::CouponNotFound(key.to_string()))
    }

    /// Get a promotion by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the promotion is not found.
    pub fn promotion(&self, key: &str) -> Result<&Promotion<'a>, FixtureError> {
        let promotion_key = self
            .promotion_keys
            .get(key)
            .ok_or_else(|| FixtureError::PromotionNotFound(key.to_string()))?;

        self.promotions
            .iter()
            .find(|promotion| promotion.key == *promotion_key)
            .ok_or_else(|| FixtureError::PromotionNotFound(key.to_string()))
    }

    /// Get all coupons
    #[must_use]
    pub fn coupons(&self) -> &[Coupon<'a>] {
        &self.coupons
    }

    /// Get all promotions
    #[must_use]
    pub fn promotions(&self) -> &[Promotion<'a>] {
        &self.promotions
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no prices have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Create an empty cart over the loaded catalog
    ///
    /// # Errors
    ///
    /// Returns an error if no prices have been loaded yet.
    pub fn cart(&self) -> Result<CartAggregate<'_>, FixtureError> {
        let currency = self.currency.ok_or(FixtureError::NoCurrency)?;

        Ok(CartAggregate::new(&self.catalog, currency))
    }

    fn load_group(&mut self, key: &str, fixture: catalog::GroupFixture) -> Result<(), FixtureError> {
        let mut members: SmallVec<[OptionKey; 8]> = SmallVec::new();
        let mut local: FxHashMap<String, OptionKey> = FxHashMap::default();

        for option in fixture.options {
            let (minor, currency) = catalog::parse_price(&option.price)?;

            self.register_currency(currency)?;

            let tax = match option.tax.as_deref().or(fixture.tax.as_deref()) {
                Some(rate) => catalog::parse_tax_rate(rate)?,
                None => TaxRate::zero(),
            };

            let option_key = self.catalog.insert_option(ModifierOption {
                name: option.name,
                price: Money::from_minor(minor, currency),
                tax,
                active: option.active.unwrap_or(true),
            });

            self.option_keys
                .insert(format!("{key}.{}", option.key), option_key);
            local.insert(option.key, option_key);
            members.push(option_key);
        }

        let default = match fixture.default {
            Some(name) => Some(
                local
                    .get(&name)
                    .copied()
                    .ok_or_else(|| FixtureError::OptionNotFound(name.clone()))?,
            ),
            None => None,
        };

        let mut excluded = FxHashSet::default();

        for name in fixture.excluded {
            let option_key = local
                .get(&name)
                .copied()
                .ok_or_else(|| FixtureError::OptionNotFound(name.clone()))?;

            excluded.insert(option_key);
        }

        let group_key = self.catalog.insert_group(ModifierGroup {
            name: fixture.name,
            min: fixture.min,
            max: fixture.max,
            default,
            excluded,
            options: members,
        });

        self.group_keys.insert(key.to_string(), group_key);

        Ok(())
    }

    fn load_product(
        &mut self,
        key: String,
        fixture: catalog::ProductFixture,
    ) -> Result<(), FixtureError> {
        let (minor, currency) = catalog::parse_price(&fixture.price)?;

        self.register_currency(currency)?;

        let tax = match fixture.tax.as_deref() {
            Some(rate) => catalog::parse_tax_rate(rate)?,
            None => TaxRate::zero(),
        };

        let category = match fixture.category {
            Some(name) => Some(
                self.category_keys
                    .get(&name)
                    .copied()
                    .ok_or_else(|| FixtureError::CategoryNotFound(name.clone()))?,
            ),
            None => None,
        };

        let mut groups: SmallVec<[GroupKey; 4]> = SmallVec::new();

        for name in fixture.groups {
            let group_key = self
                .group_keys
                .get(&name)
                .copied()
                .ok_or_else(|| FixtureError::GroupNotFound(name.clone()))?;

            groups.push(group_key);
        }

        let kind = catalog::parse_kind(fixture.kind.as_deref())?;
        let unit = catalog::parse_unit(fixture.unit.as_deref());

        let product_key = self.catalog.insert_product(Product {
            sku: fixture.sku.unwrap_or_else(|| key.clone()),
            name: fixture.name,
            price: Money::from_minor(minor, currency),
            tax,
            category,
            groups,
            unit,
            kind,
            open_price: fixture.open_price,
            active: fixture.active.unwrap_or(true),
        });

        self.product_keys.insert(key, product_key);

        Ok(())
    }

    fn register_currency(&mut self, currency: &'static Currency) -> Result<(), FixtureError> {
        if let Some(existing) = self.currency {
            if existing != currency {
                return Err(FixtureError::CurrencyMismatch(
                    existing.iso_alpha_code.to_string(),
                    currency.iso_alpha_code.to_string(),
                ));
            }
        } else {
            self.currency = Some(currency);
        }

        Ok(())
    }

    fn fixture_money(&self, price: &str) -> Result<Money<'a, Currency>, FixtureError> {
        let (minor, currency) = catalog::parse_price(price)?;
        let expected = self.currency.ok_or(FixtureError::NoCurrency)?;

        if expected != currency {
            return Err(FixtureError::CurrencyMismatch(
                expected.iso_alpha_code.to_string(),
                currency.iso_alpha_code.to_string(),
            ));
        }

        Ok(Money::from_minor(minor, currency))
    }

    fn build_discount(
        &self,
        fixture: &promotions::DiscountFixture,
    ) -> Result<DiscountValue<'a>, FixtureError> {
        match fixture {
            promotions::DiscountFixture::Percentage { value } => {
                Ok(DiscountValue::Percent(catalog::parse_percentage(value)?))
            }
            promotions::DiscountFixture::Amount { value } => {
                Ok(DiscountValue::Amount(self.fixture_money(value)?))
            }
        }
    }

    fn build_promotion(
        &self,
        key: PromotionKey,
        fixture: promotions::PromotionFixture,
    ) -> Result<Promotion<'a>, FixtureError> {
        let discount = self.build_discount(&fixture.discount)?;
        let rule = self.build_rule(fixture.rule)?;

        let offer = match fixture.offer {
            None | Some(promotions::OfferFixture::Unlimited) => OfferCap::unlimited(),
            Some(promotions::OfferFixture::Budget { limit }) => {
                OfferCap::budget(self.fixture_money(&limit)?)
            }
            Some(promotions::OfferFixture::Offers { remaining }) => OfferCap::offers(remaining),
        };

        Ok(Promotion {
            key,
            code: fixture.code,
            discount,
            rule,
            offer,
        })
    }

    fn build_rule(
        &self,
        fixture: promotions::RuleFixture,
    ) -> Result<PromotionRule<'a>, FixtureError> {
        match fixture {
            promotions::RuleFixture::TargetProducts { products } => {
                if products.is_empty() {
                    return Err(FixtureError::InvalidPromotionData(
                        "target_products needs at least one product".to_string(),
                    ));
                }

                Ok(PromotionRule::Basic {
                    target: Target::Products(self.product_set(&products)?),
                })
            }
            promotions::RuleFixture::TargetCategories { categories } => {
                if categories.is_empty() {
                    return Err(FixtureError::InvalidPromotionData(
                        "target_categories needs at least one category".to_string(),
                    ));
                }

                Ok(PromotionRule::Basic {
                    target: Target::Categories(self.category_set(&categories)?),
                })
            }
            promotions::RuleFixture::Advance { condition, reward } => Ok(PromotionRule::Advance {
                condition: self.build_condition(condition)?,
                reward: self.build_reward(reward)?,
            }),
        }
    }

    fn build_condition(
        &self,
        fixture: promotions::ConditionFixture,
    ) -> Result<Condition<'a>, FixtureError> {
        match fixture {
            promotions::ConditionFixture::BuysTheFollowingItems {
                products,
                categories,
            } => {
                if !products.is_empty() && !categories.is_empty() {
                    return Err(FixtureError::InvalidPromotionData(
                        "buys_the_following_items takes products or categories, not both"
                            .to_string(),
                    ));
                }

                let target = if !products.is_empty() {
                    Some(Target::Products(self.product_set(&products)?))
                } else if !categories.is_empty() {
                    Some(Target::Categories(self.category_set(&categories)?))
                } else {
                    None
                };

                Ok(Condition::BuysItems { target })
            }
            promotions::ConditionFixture::SpendsTheFollowingAmount { amount } => {
                Ok(Condition::SpendsAmount {
                    amount: self.fixture_money(&amount)?,
                })
            }
        }
    }

    fn build_reward(&self, fixture: promotions::RewardFixture) -> Result<Reward, FixtureError> {
        match fixture {
            promotions::RewardFixture::SaveCertainAmount => Ok(Reward::SaveAmount),
            promotions::RewardFixture::GetTheFollowingItems { items } => {
                let mut free: SmallVec<[FreeItem; 2]> = SmallVec::new();

                for item in items {
                    let product = self
                        .product_keys
                        .get(&item.product)
                        .copied()
                        .ok_or_else(|| FixtureError::ProductNotFound(item.product.clone()))?;

                    free.push(FreeItem {
                        product,
                        qty: item.qty.unwrap_or(1),
                    });
                }

                Ok(Reward::GetItems { items: free })
            }
        }
    }

    fn product_set(&self, keys: &[String]) -> Result<FxHashSet<ProductKey>, FixtureError> {
        let mut set = FxHashSet::default();

        for key in keys {
            set.insert(self.product_key(key)?);
        }

        Ok(set)
    }

    fn category_set(&self, keys: &[String]) -> Result<FxHashSet<CategoryKey>, FixtureError> {
        let mut set = FxHashSet::default();

        for key in keys {
            set.insert(self.category_key(key)?);
        }

        Ok(set)
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use super::*;

    fn write_fixture(base: &Path, category: &str, name: &str, contents: &str) -> TestResult {
        let dir = base.join(category);

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    #[test]
    fn fixture_loads_catalog_and_promotions() -> TestResult {
        let mut fixture = Fixture::new();

        fixture.load_catalog("cafe")?.load_promotions("cafe")?;

        assert_eq!(fixture.product_keys.len(), 7);
        assert_eq!(fixture.coupons().len(), 2);
        assert_eq!(fixture.promotions().len(), 3);
        assert_eq!(fixture.currency()?, GBP);

        let latte = fixture.product("latte")?;

        assert_eq!(latte.name, "Latte");
        assert_eq!(latte.price.to_minor_units(), 299);
        assert_eq!(latte.groups.len(), 2);

        Ok(())
    }

    #[test]
    fn fixture_from_set_loads_everything() -> TestResult {
        let fixture = Fixture::from_set("cafe")?;

        assert_eq!(fixture.coupons().len(), 2);
        assert_eq!(fixture.promotions().len(), 3);

        Ok(())
    }

    #[test]
    fn fixture_resolves_group_and_option_keys() -> TestResult {
        let fixture = Fixture::from_set("cafe")?;

        let milk = fixture.group_key("milk")?;
        let oat = fixture.option_key("milk.oat")?;

        let group = fixture.catalog().group(milk).ok_or("milk group missing")?;

        assert!(group.is_single_select());
        assert!(group.is_member(oat));

        Ok(())
    }

    #[test]
    fn fixture_cart_rings_up_a_product() -> TestResult {
        let fixture = Fixture::from_set("cafe")?;
        let mut cart = fixture.cart()?;

        cart.add_line(fixture.product_key("latte")?, &[], 1)?;

        let totals = cart.totals()?;

        assert_eq!(totals.grand_total.to_minor_units(), 299);

        Ok(())
    }

    #[test]
    fn fixture_exposes_coupons_and_promotions_by_key() -> TestResult {
        let fixture = Fixture::from_set("cafe")?;

        let coupon = fixture.coupon("save10")?;
        let promotion = fixture.promotion("hot-drinks")?;

        assert_eq!(coupon.code, "SAVE10");
        assert_eq!(promotion.code, "DRINKS20");

        Ok(())
    }

    #[test]
    fn fixture_product_not_found_returns_error() {
        let fixture = Fixture::new();
        let result = fixture.product("nonexistent");

        assert!(matches!(result, Err(FixtureError::ProductNotFound(_))));
    }

    #[test]
    fn fixture_coupon_and_promotion_not_found_return_errors() {
        let fixture = Fixture::new();

        assert!(matches!(
            fixture.coupon("missing"),
            Err(FixtureError::CouponNotFound(_))
        ));
        assert!(matches!(
            fixture.promotion("missing"),
            Err(FixtureError::PromotionNotFound(_))
        ));
    }

    #[test]
    fn fixture_no_currency_returns_error() {
        let fixture = Fixture::new();

        assert!(matches!(fixture.currency(), Err(FixtureError::NoCurrency)));
        assert!(matches!(fixture.cart(), Err(FixtureError::NoCurrency)));
    }

    #[test]
    fn fixture_load_catalog_rejects_currency_mismatch() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(
            dir.path(),
            "catalog",
            "usd_set",
            "products:\n  apple:\n    name: Apple\n    price: 1.00 USD\n",
        )?;

        write_fixture(
            dir.path(),
            "catalog",
            "gbp_set",
            "products:\n  banana:\n    name: Banana\n    price: 1.00 GBP\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_catalog("usd_set")?;

        let result = fixture.load_catalog("gbp_set");

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, _))));

        Ok(())
    }

    #[test]
    fn fixture_amount_coupon_before_catalog_needs_currency() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(
            dir.path(),
            "promotions",
            "solo",
            "coupons:\n  two-off:\n    code: TWOOFF\n    discount:\n      type: amount\n      value: 2.00 GBP\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());
        let result = fixture.load_promotions("solo");

        assert!(matches!(result, Err(FixtureError::NoCurrency)));

        Ok(())
    }

    #[test]
    fn fixture_unknown_grant_product_is_rejected() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(
            dir.path(),
            "catalog",
            "mini",
            "products:\n  latte:\n    name: Latte\n    price: 2.99 GBP\n",
        )?;

        write_fixture(
            dir.path(),
            "promotions",
            "mini",
            r"
promotions:
  freebie:
    code: FREEBIE
    discount:
      type: percentage
      value: 100%
    rule:
      type: advance
      condition:
        type: buys_the_following_items
      reward:
        type: get_the_following_items
        items:
          - product: unicorn
",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_catalog("mini")?;

        let result = fixture.load_promotions("mini");

        assert!(matches!(result, Err(FixtureError::ProductNotFound(name)) if name == "unicorn"));

        Ok(())
    }

    #[test]
    fn fixture_default_base_path_is_fixtures() {
        let fixture = Fixture::default();

        assert_eq!(fixture.base_path, PathBuf::from("./fixtures"));
        assert!(fixture.coupons.is_empty());
        assert!(fixture.promotions.is_empty());
    }
}
