//! ページ内で評価するスクリプト
//!
//! セレクタは JSON 文字列リテラルとして埋め込む。

use crate::config::ListingSelectors;

fn js_str(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

/// 同意ダイアログの閉じるボタンを探してクリック。クリックしたら `true`
pub(crate) fn dismiss_consent(sel: &ListingSelectors) -> String {
    format!(
        r#"
        (() => {{
            const dialogs = document.querySelectorAll({dialog});
            for (const dialog of Array.from(dialogs)) {{
                const buttons = dialog.querySelectorAll({button});
                for (const button of Array.from(buttons)) {{
                    const text = button.textContent || '';
                    if (text.includes({label})) {{
                        button.click();
                        return true;
                    }}
                }}
            }}
            return false;
        }})()
        "#,
        dialog = js_str(&sel.consent_dialog),
        button = js_str(&sel.consent_button),
        label = js_str(&sel.consent_label),
    )
}

/// ページ送りコントロールのアクセシブルラベル一覧
pub(crate) fn pagination_labels(sel: &ListingSelectors) -> String {
    format!(
        r#"
        (() => {{
            const labels = [];
            document.querySelectorAll({control}).forEach((button) => {{
                const label = button.getAttribute('aria-label');
                if (label) {{
                    labels.push(label);
                }}
            }});
            return labels;
        }})()
        "#,
        control = js_str(&sel.pagination_control),
    )
}

/// アクティブなページコントロールのラベル。なければ `null`
pub(crate) fn active_page_label(sel: &ListingSelectors) -> String {
    format!(
        r#"
        (() => {{
            const active = document.querySelector({active});
            return active ? active.getAttribute('aria-label') : null;
        }})()
        "#,
        active = js_str(&sel.active_control),
    )
}

/// 現在ページのレコード一覧。結果コンテナがなければ `null`
pub(crate) fn extract_records(sel: &ListingSelectors) -> String {
    format!(
        r#"
        (() => {{
            const wrapper = document.querySelector({wrapper});
            if (!wrapper) {{
                return null;
            }}
            const records = [];
            wrapper.querySelectorAll({item}).forEach((item) => {{
                const record = {{ name: '', providers: [] }};
                const nameElement = item.querySelector({name});
                if (nameElement) {{
                    record.name = nameElement.textContent || '';
                }}
                item.querySelectorAll({offer}).forEach((offerElement) => {{
                    const offer = {{}};
                    const href = offerElement.getAttribute('href');
                    if (href !== null) {{
                        offer.url = href;
                    }}
                    const priceElement = offerElement.querySelector({price});
                    if (priceElement) {{
                        offer.price = priceElement.textContent || '';
                    }}
                    const logoElement = offerElement.querySelector({logo});
                    if (logoElement) {{
                        offer.logo = logoElement.getAttribute('src') || '';
                    }}
                    record.providers.push(offer);
                }});
                records.push(record);
            }});
            return records;
        }})()
        "#,
        wrapper = js_str(&sel.results_wrapper),
        item = js_str(&sel.item),
        name = js_str(&sel.name),
        offer = js_str(&sel.offer),
        price = js_str(&sel.price),
        logo = js_str(&sel.logo),
    )
}
