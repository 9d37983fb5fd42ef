use hb_api_types::{Product, ProductId};
use rust_decimal::Decimal;

/// Built-in catalog used when neither the backend nor the cache can provide one.
pub fn seed_products() -> Vec<Product> {
    vec![
        Product {
            id: ProductId::new("1"),
            name: "Marsea Herbal Oil (150 ml)".to_owned(),
            category: "Hair Oil".to_owned(),
            price: Decimal::new(800, 0),
            image: "marsea-oil.jpg".to_owned(),
            details: "100% pure herbal hair oil, crafted with coconut oil, castor oil, and olive oil, \
                      enriched with amla, bhringraj, fenugreek, hibiscus, neem, black seeds, aloe vera, \
                      and rosemary. Strengthens roots, promotes hair growth, soothes the scalp, and is \
                      suitable for all hair types."
                .to_owned(),
        },
        Product {
            id: ProductId::new("2"),
            name: "Apricot Kernel Oil (100ml)".to_owned(),
            category: "Hair Oil".to_owned(),
            price: Decimal::new(700, 0),
            image: "apricot.jpg".to_owned(),
            details: "Lightweight oil rich in vitamins A, C, and E; nourishes the scalp, improves \
                      shine, and strengthens hair follicles. Ideal for daily use and sensitive scalps."
                .to_owned(),
        },
        Product {
            id: ProductId::new("3"),
            name: "Natural Teeth Whitening Powder".to_owned(),
            category: "Teeth Whitener".to_owned(),
            price: Decimal::new(500, 0),
            image: "teeth.jpg".to_owned(),
            details: "Herbal formula for naturally whiter teeth without harsh chemicals, crafted with \
                      activated charcoal and gentle natural abrasives. Safe for daily use with a subtle \
                      mint flavor."
                .to_owned(),
        },
        Product {
            id: ProductId::new("4"),
            name: "Aloe Vera Skin Toner".to_owned(),
            category: "Skin Toners".to_owned(),
            price: Decimal::new(750, 0),
            image: "face-toner.jpg".to_owned(),
            details: "Hydrates skin and soothes irritation with aloe vera, cucumber, honey, and rose \
                      water. Suitable for all skin types."
                .to_owned(),
        },
    ]
}
