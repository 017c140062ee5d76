//! Product extraction pipeline
//!
//! Locates product containers, pulls fields, matches nutrition labels,
//! normalizes values and parses ingredients, then assembles one
//! [`ProductRecord`] per container that has a name.

mod fields;
mod ingredients;
mod labels;
mod patterns;
mod values;

pub use fields::{resolve_url, split_sizes, TextBlock};
pub use ingredients::split_ingredients;
pub use labels::LabelMatcher;
pub use patterns::{Fragment, LabelPatterns, Patterns};
pub use values::{clean_value, daily_value, first_integer, parse_number};

use scraper::{ElementRef, Html};
use tracing::{debug, info};
use url::Url;

use crate::config::{ExtractorConfig, FieldKey, SelectorConfig};
use crate::dom::DocumentNode;
use crate::error::Result;
use crate::model::{NutritionFacts, ProductRecord, Sugars};

/// Selectors compiled for one document tree implementation
struct Queries<N: DocumentNode> {
    container: N::Query,
    content: N::Query,
    title: N::Query,
    text_region: N::Query,
    paragraphs: N::Query,
    image: N::Query,
    nutrition: N::Query,
    row: N::Query,
    label_cell: N::Query,
    value_cells: Vec<N::Query>,
    daily_value_cell: N::Query,
    ingredients_heading: N::Query,
}

impl<N: DocumentNode> Queries<N> {
    fn compile(selectors: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            container: N::compile(&selectors.container)?,
            content: N::compile(&selectors.content)?,
            title: N::compile(&selectors.title)?,
            text_region: N::compile(&selectors.text_region)?,
            paragraphs: N::compile(&selectors.paragraphs)?,
            image: N::compile(&selectors.image)?,
            nutrition: N::compile(&selectors.nutrition)?,
            row: N::compile(&selectors.row)?,
            label_cell: N::compile(&selectors.label_cell)?,
            value_cells: selectors
                .value_cells
                .iter()
                .map(|s| N::compile(s))
                .collect::<Result<Vec<_>>>()?,
            daily_value_cell: N::compile(&selectors.daily_value_cell)?,
            ingredients_heading: N::compile(&selectors.ingredients_heading)?,
        })
    }
}

/// Extracts product records from a loaded document tree.
///
/// Stateless between calls: the same tree always yields the same records.
#[derive(Debug, Clone, Default)]
pub struct ProductExtractor {
    config: ExtractorConfig,
    origin: Option<Url>,
}

impl ProductExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            config,
            origin: None,
        }
    }

    /// Base used to resolve relative image links.
    pub fn with_origin(mut self, origin: Url) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Parse `html` and extract every product on it.
    pub fn extract_html(&self, html: &str) -> Result<Vec<ProductRecord>> {
        let document = Html::parse_document(html);
        let root: ElementRef<'_> = document.root_element();
        self.extract(&root)
    }

    /// Run the pipeline over any document tree.
    ///
    /// Only an invalid selector in the configuration is an error; missing
    /// elements produce empty fields and nameless containers are skipped.
    pub fn extract<N: DocumentNode>(&self, root: &N) -> Result<Vec<ProductRecord>> {
        let queries = Queries::<N>::compile(&self.config.selectors)?;
        let patterns = Patterns::compile(&self.config)?;
        let containers = root.find_all(&queries.container);

        let mut products = Vec::with_capacity(containers.len());
        for (index, container) in containers.iter().enumerate() {
            match self.assemble(container, &queries, &patterns) {
                Some(record) => {
                    debug!(index, name = %record.product_name, "extracted product");
                    products.push(record);
                }
                None => debug!(index, "skipping container without product name"),
            }
        }

        info!(
            containers = containers.len(),
            products = products.len(),
            "extraction finished"
        );
        Ok(products)
    }

    fn assemble<N: DocumentNode>(
        &self,
        container: &N,
        q: &Queries<N>,
        patterns: &Patterns,
    ) -> Option<ProductRecord> {
        let content = container
            .find_first(&q.content)
            .unwrap_or_else(|| container.clone());

        let product_name = fields::product_name(container, &content, &q.title);
        if product_name.is_empty() {
            return None;
        }

        let text = fields::text_block(
            &content,
            &q.text_region,
            &q.paragraphs,
            &patterns.available_sizes,
        );
        let product_image_link = fields::image_link(
            container,
            &q.image,
            &self.config.selectors.image_attributes,
            self.origin.as_ref(),
        );

        // Without a nutrition region there are no rows, but an ingredients
        // heading may still sit directly in the container
        let region = container
            .find_first(&q.nutrition)
            .unwrap_or_else(|| container.clone());
        let matcher = LabelMatcher::new(&region, &q.row, &q.label_cell, &patterns.labels);

        let nutrition_facts = nutrition_facts(&matcher, q, patterns);
        let ingredients = ingredients::ingredients_text(
            &region,
            &matcher,
            &q.value_cells,
            &q.ingredients_heading,
            &self.config.selectors.ingredients_paragraph_tag,
            patterns.labels.fragments(FieldKey::Ingredients),
        )
        .map(|text| split_ingredients(&text))
        .unwrap_or_default();

        Some(ProductRecord {
            product_name,
            description: text.description,
            available_sizes: text.available_sizes,
            nutrition_facts,
            ingredients,
            product_image_link,
        })
    }
}

fn nutrition_facts<N: DocumentNode>(
    matcher: &LabelMatcher<N>,
    q: &Queries<N>,
    patterns: &Patterns,
) -> NutritionFacts {
    if matcher.is_empty() {
        return NutritionFacts::default();
    }

    let nutrient = |key| values::nutrient(matcher.row_for(key), &q.value_cells, &q.daily_value_cell);
    let calories = matcher
        .row_for(FieldKey::Calories)
        .and_then(|row| values::value_text(row, &q.value_cells))
        .and_then(|text| clean_value(&text));

    NutritionFacts {
        serving_size: values::serving_size(matcher, &patterns.serving_size, &q.value_cells),
        servings_per_container: values::servings_per_container(
            matcher,
            &patterns.servings_per_container,
        ),
        calories: parse_number(calories.as_deref()),
        total_fat: nutrient(FieldKey::TotalFat),
        sodium: nutrient(FieldKey::Sodium),
        total_carbohydrate: nutrient(FieldKey::TotalCarbohydrate),
        total_sugars: {
            let sugars = nutrient(FieldKey::TotalSugars);
            Sugars {
                value: sugars.value,
                includes_added_sugars: nutrient(FieldKey::IncludesAddedSugars),
            }
        },
        protein: nutrient(FieldKey::Protein),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIETNAMESE_PAGE: &str = r#"
    <html><body>
    <div class="product-information">
        <div class="product-information__content">
            <h3 class="cmp-title__text">Coca-Cola Nguyên Bản</h3>
            <div class="text">
                <p>Hương vị nguyên bản sảng khoái.</p>
                <p>Có các loại bao bì: Lon 320ml, Chai 390ml</p>
            </div>
            <div class="text footer__mobile-accordion"><p>Liên hệ</p></div>
        </div>
        <img class="cmp-image__image" src="/content/dam/vn/coca-cola.png">
        <div class="nutritional-information">
            <div class="nutritional-information__row">
                <div class="column1">GIÁ TRỊ DINH DƯỠNG TRONG 100ML</div><div class="column3">100ml</div>
            </div>
            <div class="nutritional-information__row">
                <div class="column1">NĂNG LƯỢNG</div><div class="column3">42 kcal</div>
            </div>
            <div class="nutritional-information__row">
                <div class="column1">CHẤT BÉO</div><div class="column3">0 g</div>
            </div>
            <div class="nutritional-information__row">
                <div class="column1">NATRI</div><div class="column3">≤12,5 mg</div>
            </div>
            <div class="nutritional-information__row">
                <div class="column1">CHẤT BỘT ĐƯỜNG</div><div class="column3">10,6 g</div>
            </div>
            <div class="nutritional-information__row">
                <div class="column1">ĐƯỜNG</div><div class="column3">10,6 g</div>
            </div>
            <div class="nutritional-information__row">
                <div class="column1">CHẤT ĐẠM</div><div class="column3">0 g</div>
            </div>
            <h3>Thành phần</h3>
            <p>Nước bão hòa CO2, đường mía, màu tự nhiên (150d), chất điều chỉnh độ acid (338), hương cola tự nhiên, caffeine.</p>
        </div>
    </div>
    </body></html>
    "#;

    #[test]
    fn test_extract_vietnamese_product() {
        let extractor = ProductExtractor::default()
            .with_origin(Url::parse("https://www.coca-cola.com").unwrap());
        let products = extractor.extract_html(VIETNAMESE_PAGE).unwrap();

        assert_eq!(products.len(), 1);
        let p = &products[0];
        assert_eq!(p.product_name, "Coca-Cola Nguyên Bản");
        assert_eq!(p.description, "Hương vị nguyên bản sảng khoái.");
        assert_eq!(p.available_sizes, vec!["Lon 320ml", "Chai 390ml"]);
        assert_eq!(
            p.product_image_link,
            "https://www.coca-cola.com/content/dam/vn/coca-cola.png"
        );

        let nf = &p.nutrition_facts;
        assert_eq!(nf.serving_size, "100ml");
        assert_eq!(nf.servings_per_container, None);
        assert_eq!(nf.calories, Some(42.0));
        assert_eq!(nf.total_fat.value, Some(0.0));
        assert_eq!(nf.sodium.value, Some(12.5));
        assert_eq!(nf.total_carbohydrate.value, Some(10.6));
        assert_eq!(nf.total_sugars.value, Some(10.6));
        assert_eq!(nf.total_sugars.includes_added_sugars.value, None);
        assert_eq!(nf.protein.value, Some(0.0));

        assert_eq!(
            p.ingredients,
            vec![
                "Nước bão hòa CO2",
                "đường mía",
                "màu tự nhiên (150d)",
                "chất điều chỉnh độ acid (338)",
                "hương cola tự nhiên",
                "caffeine"
            ]
        );
    }

    #[test]
    fn test_nameless_container_is_dropped() {
        let html = r#"
        <div class="product-information"><h3 class="cmp-title__text">Sprite</h3></div>
        <div class="product-information"><div class="text"><p>No title here</p></div></div>
        "#;
        let products = ProductExtractor::default().extract_html(html).unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].product_name, "Sprite");
        assert_eq!(products[0].nutrition_facts, NutritionFacts::default());
        assert!(products[0].ingredients.is_empty());
        assert_eq!(products[0].product_image_link, "");
    }

    #[test]
    fn test_empty_page() {
        let products = ProductExtractor::default()
            .extract_html("<html><body><p>nothing</p></body></html>")
            .unwrap();
        assert!(products.is_empty());
    }

    #[test]
    fn test_invalid_selector_config() {
        let mut config = ExtractorConfig::default();
        config.selectors.row = "div[".to_string();

        let err = ProductExtractor::new(config).extract_html(VIETNAMESE_PAGE);
        assert!(err.is_err());
    }

    #[test]
    fn test_label_override_keeps_other_fields() {
        let config = ExtractorConfig::from_json(r#"{"labels": {"calories": ["Energía"]}}"#).unwrap();
        let html = r#"
        <div class="product-information">
            <h3 class="cmp-title__text">Coca-Cola Sin Azúcar</h3>
            <div class="nutritional-information">
                <div class="nutritional-information__row"><div class="column1">Energía</div><div class="column3">1 kcal</div></div>
                <div class="nutritional-information__row"><div class="column1">Protein</div><div class="column3">0,2 g</div></div>
            </div>
        </div>
        "#;
        let products = ProductExtractor::new(config).extract_html(html).unwrap();

        let nf = &products[0].nutrition_facts;
        assert_eq!(nf.calories, Some(1.0));
        assert_eq!(nf.protein.value, Some(0.2));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let extractor = ProductExtractor::default();
        let first = serde_json::to_string(&extractor.extract_html(VIETNAMESE_PAGE).unwrap()).unwrap();
        let second = serde_json::to_string(&extractor.extract_html(VIETNAMESE_PAGE).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
