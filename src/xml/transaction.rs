use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::Result;
use crate::model::{Header, Transaction, TransactionId};
use crate::store::TransactionStore;

use super::{escape_attr, escape_xml};

/// Width of one line of base64 body text.
const BASE64_LINE_WIDTH: usize = 76;

/// Memoized `http-transaction` fragments, keyed by transaction id.
///
/// The first [`get`](Self::get) for an id fetches the transaction from the
/// store and renders it; later calls return the stored fragment. Entries are
/// never modified once inserted. Concurrent misses may render the same id
/// twice, but only the first inserted fragment is kept and returned to all
/// callers.
pub struct TransactionCache {
    store: Arc<dyn TransactionStore>,
    fragments: RwLock<HashMap<TransactionId, String>>,
}

impl TransactionCache {
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self {
            store,
            fragments: RwLock::new(HashMap::new()),
        }
    }

    /// Fragment for `id`, rendering and caching it on first use.
    pub fn get(&self, id: TransactionId) -> Result<String> {
        if let Some(fragment) = self.cached(id) {
            return Ok(fragment);
        }

        let transaction = self.store.lookup(id)?;
        let fragment = render(&transaction);

        let mut fragments = self.write();
        Ok(fragments.entry(id).or_insert(fragment).clone())
    }

    /// Lookup-only query; never touches the store.
    pub fn cached(&self, id: TransactionId) -> Option<String> {
        self.read().get(&id).cloned()
    }

    pub fn is_cached(&self, id: TransactionId) -> bool {
        self.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached fragment. Used once the report is finished.
    pub fn clear(&self) {
        self.write().clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<TransactionId, String>> {
        match self.fragments.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<TransactionId, String>> {
        match self.fragments.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Render one transaction as an `http-transaction` element.
pub fn render(transaction: &Transaction) -> String {
    let mut xml = format!("<http-transaction id=\"{}\">\n\n", transaction.id);

    render_message(
        &mut xml,
        "http-request",
        &transaction.request.status_line(),
        &transaction.request.headers,
        &transaction.request.body,
    );
    xml.push('\n');
    render_message(
        &mut xml,
        "http-response",
        &transaction.response.status_line(),
        &transaction.response.headers,
        &transaction.response.body,
    );

    xml.push_str("\n</http-transaction>");
    xml
}

/// Stand-in for a transaction the store does not know about.
pub fn render_missing(id: TransactionId) -> String {
    format!("<http-transaction id=\"{}\" />", id)
}

fn render_message(xml: &mut String, tag: &str, status: &str, headers: &[Header], body: &[u8]) {
    xml.push_str(&format!("    <{}>\n", tag));
    xml.push_str(&format!("        <status>{}</status>\n", escape_xml(status)));

    xml.push_str("        <headers>\n");
    for header in headers {
        xml.push_str(&format!(
            "            <header field=\"{}\" content=\"{}\" />\n",
            escape_attr(&header.name),
            escape_attr(&header.value)
        ));
    }
    xml.push_str("        </headers>\n");

    xml.push_str(&format!(
        "        <body content-encoding=\"base64\">{}</body>\n",
        encode_body(body)
    ));
    xml.push_str(&format!("    </{}>\n", tag));
}

/// MIME-style base64: 76-column lines, each ending in `\n`. An empty body is
/// a lone line break.
fn encode_body(body: &[u8]) -> String {
    let encoded = STANDARD.encode(body);
    if encoded.is_empty() {
        return "\n".into();
    }

    let mut wrapped = String::with_capacity(encoded.len() + encoded.len() / BASE64_LINE_WIDTH + 1);
    // base64 output is ASCII, so byte chunks are char boundaries.
    for line in encoded.as_bytes().chunks(BASE64_LINE_WIDTH) {
        wrapped.push_str(&String::from_utf8_lossy(line));
        wrapped.push('\n');
    }
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use crate::model::{HttpRequest, HttpResponse};
    use crate::store::MemoryTransactionStore;
    use crate::test_support::assert_well_formed;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample(id: TransactionId) -> Transaction {
        Transaction::new(
            id,
            HttpRequest::new("http://example.test/a/b/c.php", "a=1").with_header("User-Agent", "X"),
            HttpResponse::new(200, "<html>").with_header("Content-Type", "text/html"),
        )
    }

    fn expected(id: TransactionId) -> String {
        format!(
            concat!(
                "<http-transaction id=\"{}\">\n\n",
                "    <http-request>\n",
                "        <status>POST http://example.test/a/b/c.php HTTP/1.1</status>\n",
                "        <headers>\n",
                "            <header field=\"User-Agent\" content=\"X\" />\n",
                "        </headers>\n",
                "        <body content-encoding=\"base64\">YT0x\n</body>\n",
                "    </http-request>\n\n",
                "    <http-response>\n",
                "        <status>HTTP/1.1 200 OK</status>\n",
                "        <headers>\n",
                "            <header field=\"Content-Type\" content=\"text/html\" />\n",
                "        </headers>\n",
                "        <body content-encoding=\"base64\">PGh0bWw+\n</body>\n",
                "    </http-response>\n\n",
                "</http-transaction>"
            ),
            id
        )
    }

    /// Counts lookups so tests can tell a cache hit from a re-fetch.
    struct CountingStore {
        inner: MemoryTransactionStore,
        lookups: AtomicUsize,
    }

    impl TransactionStore for CountingStore {
        fn lookup(&self, id: TransactionId) -> Result<Transaction> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.lookup(id)
        }
    }

    fn counting_cache(transactions: Vec<Transaction>) -> (Arc<CountingStore>, TransactionCache) {
        let store = Arc::new(CountingStore {
            inner: transactions.into_iter().collect(),
            lookups: AtomicUsize::new(0),
        });
        let cache = TransactionCache::new(store.clone());
        (store, cache)
    }

    #[test]
    fn renders_literal_layout() {
        let xml = render(&sample(1));
        assert_eq!(xml, expected(1));
        assert_well_formed(&xml);
    }

    #[test]
    fn header_casing_is_not_normalized() {
        let tx = Transaction::new(
            3,
            HttpRequest::new("http://example.test/", "").with_header("User-agent", "w3"),
            HttpResponse::new(200, "").with_header("content-TYPE", "text/plain"),
        );
        let xml = render(&tx);
        assert!(xml.contains("<header field=\"User-agent\" content=\"w3\" />"));
        assert!(xml.contains("<header field=\"content-TYPE\" content=\"text/plain\" />"));
    }

    #[test]
    fn empty_bodies_still_emit_body_blocks() {
        let tx = Transaction::new(
            4,
            HttpRequest::new("http://example.test/", ""),
            HttpResponse::new(204, ""),
        );
        let xml = render(&tx);
        assert_eq!(
            xml.matches("<body content-encoding=\"base64\">\n</body>").count(),
            2
        );
        assert!(xml.contains("<status>GET http://example.test/ HTTP/1.1</status>"));
        assert!(xml.contains("<status>HTTP/1.1 204 No Content</status>"));
    }

    #[test]
    fn long_bodies_wrap_at_76_columns() {
        let encoded = encode_body(&[b'x'; 200]);
        let lines: Vec<&str> = encoded.split_terminator('\n').collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[..3].iter().all(|l| l.len() == BASE64_LINE_WIDTH));
        assert!(encoded.ends_with('\n'));

        let joined: String = lines.concat();
        assert_eq!(STANDARD.decode(joined).unwrap(), vec![b'x'; 200]);
    }

    #[test]
    fn binary_response_body_is_well_formed() {
        let body: Vec<u8> = (0u8..=255).cycle().take(4096).collect();
        let tx = Transaction::new(
            5,
            HttpRequest::new("http://rpm-path-binary/", ""),
            HttpResponse::new(200, body).with_header("Content-Type", "text/plain"),
        );
        assert_well_formed(&render(&tx));
    }

    #[test]
    fn hostile_header_values_are_escaped() {
        let tx = Transaction::new(
            6,
            HttpRequest::new("http://example.test/?q=<script>&x=\"1\"", ""),
            HttpResponse::new(200, "").with_header("X-Evil", "a\0b\x0B\"<>'&"),
        );
        let xml = render(&tx);
        assert!(xml.contains("content=\"ab&quot;&lt;&gt;&apos;&amp;\""));
        assert_well_formed(&xml);
    }

    #[test]
    fn cache_fills_on_first_get() {
        let (store, cache) = counting_cache(vec![sample(2)]);

        assert!(!cache.is_cached(2));
        assert!(cache.cached(2).is_none());

        let first = cache.get(2).unwrap();
        assert_eq!(first, expected(2));
        assert!(cache.is_cached(2));
        assert_eq!(cache.cached(2).as_deref(), Some(first.as_str()));

        let second = cache.get(2).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_transaction_is_not_cached() {
        let (_, cache) = counting_cache(vec![]);
        let err = cache.get(9).unwrap_err();
        assert!(matches!(err, ReportError::TransactionNotFound(9)));
        assert!(!cache.is_cached(9));
    }

    #[test]
    fn concurrent_gets_converge_on_one_fragment() {
        let (_, cache) = counting_cache(vec![sample(1)]);
        let cache = Arc::new(cache);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.get(1).unwrap())
            })
            .collect();
        let results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(results.iter().all(|r| *r == expected(1)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_empties_cache() {
        let (store, cache) = counting_cache(vec![sample(1)]);
        cache.get(1).unwrap();
        cache.clear();
        assert!(cache.is_empty());
        cache.get(1).unwrap();
        assert_eq!(store.lookups.load(Ordering::SeqCst), 2);
    }
}
