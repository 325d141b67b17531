//! JavaScript snippets evaluated against the loaded document

/// Hides both scrollbars without changing the layout.
pub const HIDE_SCROLLBARS: &str = "(function() {\
var style = document.createElement('style');\
style.textContent = '::-webkit-scrollbar { display: none; } html { scrollbar-width: none; }';\
(document.head || document.documentElement).appendChild(style);\
})();";

/// Natural size of the document content, as `{ width, height }`.
pub const CONTENT_SIZE: &str = "(function() {\
var root = document.documentElement;\
var body = document.body;\
return {\
width: Math.max(root ? root.scrollWidth : 0, body ? body.scrollWidth : 0),\
height: Math.max(root ? root.scrollHeight : 0, body ? body.scrollHeight : 0)\
};\
})()";

/// Scales the whole page, layout included.
pub fn page_zoom(factor: f64) -> String {
    format!("document.documentElement.style.zoom = '{factor}';")
}

/// Scales font sizes only.
///
/// Computed sizes are all read before any is written so nested elements are not
/// scaled twice.
pub fn text_zoom(factor: f64) -> String {
    format!(
        "(function(factor) {{\
var nodes = document.querySelectorAll('body, body *');\
var sizes = [];\
for (var i = 0; i < nodes.length; i++) {{ sizes.push(parseFloat(getComputedStyle(nodes[i]).fontSize)); }}\
for (var i = 0; i < nodes.length; i++) {{ if (!isNaN(sizes[i])) {{ nodes[i].style.fontSize = (sizes[i] * factor) + 'px'; }} }}\
}})({factor});"
    )
}

/// Appends a `<style>` element holding `css` to the document head.
///
/// The CSS is pasted into a single-quoted JavaScript literal. Line breaks are
/// escaped; quotes and backslashes are not, so CSS containing `'` breaks the
/// snippet.
pub fn inject_style(css: &str) -> String {
    let literal = css.replace('\r', "\\r").replace('\n', "\\n");

    let mut js = String::with_capacity(literal.len() + 160);
    js.push_str("var style = document.createElement('style');var txt = document.createTextNode('");
    js.push_str(&literal);
    js.push_str("'); style.appendChild(txt);document.getElementsByTagName('head')[0].appendChild(style);");
    js
}
