use crate::error::Result;

/// Renders a page, scripts included, and hands back its serialized DOM.
#[async_trait::async_trait]
pub trait PageRenderer: Send + Sync {
    /// Navigate to a URL and return the rendered HTML
    async fn render(&self, url: &str) -> Result<String>;

    /// Release the underlying browser; later calls to `render` fail
    async fn close(&self) -> Result<()>;
}

/// Evaluates a single expression with no access to any crawled page.
#[async_trait::async_trait]
pub trait ScriptEvaluator: Send + Sync {
    /// Evaluate `expression` and return its string value
    async fn evaluate(&self, expression: &str) -> Result<String>;
}

/// Wrap a `javascript:` expression so it runs against a throwaway scope.
///
/// `document.write` output is captured and returned when the expression
/// itself yields `undefined` (the `void(document.write(...))` idiom), and
/// `location` assignments land on a local object.
pub fn sandboxed_expression(expression: &str) -> String {
    let literal = serde_json::to_string(expression).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        r"(function () {{
  var __out = '';
  var __sink = function () {{ __out += Array.prototype.join.call(arguments, ''); }};
  var document = {{ write: __sink, writeln: __sink }};
  var location = {{ href: '' }};
  var window = {{ document: document, location: location }};
  var __value = eval({literal});
  if (__value === undefined || __value === null) {{
    return __out || (typeof location === 'string' ? location : location.href);
  }}
  return String(__value);
}})()"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sandboxed_expression_embeds_literal() {
        let wrapped = sandboxed_expression("'a'+'@'+'b.org'");
        assert!(wrapped.contains(r#"eval("'a'+'@'+'b.org'")"#));
        assert!(wrapped.starts_with("(function () {"));
        assert!(wrapped.ends_with("})()"));
    }

    #[test]
    fn test_sandboxed_expression_escapes_quotes() {
        let wrapped = sandboxed_expression(r#"alert("x")"#);
        assert!(wrapped.contains(r#"eval("alert(\"x\")")"#));
    }

    #[test]
    fn test_sandboxed_expression_shadows_document() {
        let wrapped = sandboxed_expression("void(document.write('x'))");
        assert!(wrapped.contains("var document ="));
        assert!(wrapped.contains("var window ="));
    }
}
