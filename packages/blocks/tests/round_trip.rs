//! Round-trip tests for the block content codec
//!
//! A block forest encoded into page content and decoded again must come back
//! deep-equal: types, payloads, nested children and breakpoint styles.

use proptest::prelude::*;
use vos_blocks::{
    decode_blocks, encode_blocks, Block, BlockList, BlockType, Breakpoint, StyleMap, StyleProperty,
    StyleValue, Styles,
};

/// Signed lengths with up to two fractional digits, e.g. `-12.5px`
fn length_strategy() -> impl Strategy<Value = String> {
    (
        -500..500i32,
        0..100u32,
        prop::sample::select(vec!["px", "rem", "em", "%", "vh", "vw"]),
    )
        .prop_map(|(whole, frac, unit)| {
            if frac == 0 {
                format!("{}{}", whole, unit)
            } else {
                format!("{}.{:02}{}", whole, frac, unit)
            }
        })
}

fn family_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Z][a-z]{2,8}",
        "[A-Z][a-z]{2,8} [A-Z][a-z]{2,8}",
        Just("sans-serif".to_string()),
        Just("serif".to_string()),
    ]
}

fn font_stack_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec((family_strategy(), any::<bool>()), 1..4).prop_map(|families| {
        let single = families.len() == 1;
        families
            .into_iter()
            .map(|(family, quote)| {
                // A lone unquoted name is a keyword, not a stack
                if quote || single || family.contains(' ') {
                    format!("\"{}\"", family)
                } else {
                    family
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    })
}

fn style_map_strategy() -> impl Strategy<Value = StyleMap> {
    prop::collection::vec(
        prop_oneof![
            scalar_style_strategy(),
            composite_style_strategy(),
        ],
        0..6,
    )
    .prop_map(|entries| {
        let mut map = StyleMap::new();
        for (property, css) in entries {
            map.set_css(property, &css).expect("strategy only yields valid styles");
        }
        map
    })
}

fn scalar_style_strategy() -> impl Strategy<Value = (StyleProperty, String)> {
    prop_oneof![
        length_strategy().prop_map(|css| (StyleProperty::FontSize, css)),
        length_strategy().prop_map(|css| (StyleProperty::LetterSpacing, css)),
        (0..100u32).prop_map(|n| (StyleProperty::Opacity, format!("0.{}", n))),
        (-5..50i32).prop_map(|n| (StyleProperty::ZIndex, n.to_string())),
        "#[0-9a-f]{6}".prop_map(|hex| (StyleProperty::Color, hex)),
        (0..256u32, 0..256u32, 0..256u32)
            .prop_map(|(r, g, b)| (StyleProperty::BackgroundColor, format!("rgb({}, {}, {})", r, g, b))),
        (0..256u32, 1..10u32).prop_map(|(c, a)| {
            (StyleProperty::BorderColor, format!("rgba({}, {}, {}, 0.{})", c, c, c, a))
        }),
        prop::sample::select(vec!["left", "center", "right", "justify"])
            .prop_map(|k| (StyleProperty::TextAlign, k.to_string())),
    ]
}

fn composite_style_strategy() -> impl Strategy<Value = (StyleProperty, String)> {
    prop_oneof![
        (length_strategy(), length_strategy())
            .prop_map(|(a, b)| (StyleProperty::Padding, format!("{} {}", a, b))),
        prop::collection::vec(length_strategy(), 1..5)
            .prop_map(|values| (StyleProperty::Margin, values.join(" "))),
        font_stack_strategy().prop_map(|css| (StyleProperty::FontFamily, css)),
        "[A-Z][a-z]{2,8}".prop_map(|family| (StyleProperty::FontFamily, family)),
        (1..12u32).prop_map(|n| (StyleProperty::GridTemplateColumns, format!("repeat({}, 1fr)", n))),
        "/[a-z]{1,10}/[a-z0-9-]{1,12}\\.(png|jpg)"
            .prop_map(|path| (StyleProperty::BackgroundImage, format!("url({})", path))),
    ]
}

fn styles_strategy() -> impl Strategy<Value = Styles> {
    (
        style_map_strategy(),
        prop::option::of(style_map_strategy()),
        prop::option::of(style_map_strategy()),
    )
        .prop_map(|(base, tablet, mobile)| Styles { base, tablet, mobile })
}

fn leaf_strategy() -> impl Strategy<Value = Block> {
    prop_oneof![
        ("[a-z]{1,8}", "[a-zA-Z <>/]{0,40}").prop_map(|(id, content)| Block::text(id, content)),
        ("[a-z]{1,8}", "/[a-z]{1,10}\\.png", "[a-zA-Z ]{0,20}")
            .prop_map(|(id, src, alt)| Block::image(id, src, alt)),
    ]
}

fn block_strategy() -> impl Strategy<Value = Block> {
    let leaf = (leaf_strategy(), styles_strategy()).prop_map(|(b, s)| b.with_styles(s));
    leaf.prop_recursive(3, 24, 4, |inner| {
        (
            "[a-z]{1,8}",
            prop::sample::select(vec![
                BlockType::Container,
                BlockType::Row,
                BlockType::Column,
                BlockType::Section,
                BlockType::Component,
            ]),
            prop::collection::vec(inner, 0..4),
            styles_strategy(),
            prop::option::of("[a-z-]{1,12}"),
        )
            .prop_map(|(id, block_type, children, styles, component)| {
                let mut block = Block::container(id, block_type, children).with_styles(styles);
                block.component_id = component;
                block
            })
    })
}

/// Give every block a unique id so the forest is a valid document
fn renumber(list: BlockList, next: &mut usize) -> BlockList {
    list.iter()
        .map(|block| {
            let mut block = block.clone();
            *next += 1;
            block.id = format!("{}-{}", block.id, next).into();
            block.children = block.children.map(|c| renumber(c, next));
            block
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_content_round_trips(blocks in prop::collection::vec(block_strategy(), 0..5)) {
        let mut counter = 0;
        let forest = renumber(BlockList::from(blocks), &mut counter);

        let content = encode_blocks(&forest).unwrap();
        let decoded = decode_blocks(&content).unwrap();

        prop_assert_eq!(decoded, forest);
    }
}

#[test]
fn test_single_family_font_stack_round_trips() {
    let mut styles = Styles::default();
    styles.set_css(Breakpoint::Desktop, StyleProperty::FontFamily, "\"Inter\"").unwrap();
    styles.set_css(Breakpoint::Mobile, StyleProperty::FontFamily, "'Playfair Display'").unwrap();

    let forest = BlockList::from(vec![Block::text("intro", "<p>Hi</p>").with_styles(styles)]);
    let decoded = decode_blocks(&encode_blocks(&forest).unwrap()).unwrap();
    assert_eq!(decoded, forest);

    let intro = decoded.find(&"intro".into()).unwrap();
    assert_eq!(
        intro.styles.base.get(StyleProperty::FontFamily),
        Some(&StyleValue::FontStack(vec!["Inter".into()]))
    );
}

#[test]
fn test_nested_breakpoint_styles_round_trip() {
    let mut heading_styles = Styles::default();
    heading_styles.set_css(Breakpoint::Desktop, StyleProperty::FontSize, "64px").unwrap();
    heading_styles.set_css(Breakpoint::Tablet, StyleProperty::FontSize, "48px").unwrap();
    heading_styles.set_css(Breakpoint::Mobile, StyleProperty::FontSize, "32px").unwrap();
    heading_styles.set_css(Breakpoint::Mobile, StyleProperty::TextAlign, "center").unwrap();

    let forest = BlockList::from(vec![Block::container(
        "hero",
        BlockType::Section,
        vec![
            Block::text("title", "<h1>We design brands</h1>").with_styles(heading_styles),
            Block::container(
                "grid",
                BlockType::Row,
                vec![
                    Block::container("col-1", BlockType::Column, vec![Block::image("img-1", "/a.jpg", "A")]),
                    Block::container("col-2", BlockType::Column, vec![Block::text("copy", "<p>Hi</p>")]),
                ],
            ),
        ],
    )]);

    let decoded = decode_blocks(&encode_blocks(&forest).unwrap()).unwrap();
    assert_eq!(decoded, forest);

    let title = decoded.find(&"title".into()).unwrap();
    let mobile = title.styles.resolve(Breakpoint::Mobile);
    assert_eq!(mobile.get(StyleProperty::FontSize).unwrap().to_string(), "32px");
}
