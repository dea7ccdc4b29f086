//! 页面注入脚本常量
//!
//! 集中管理所有通过 `Driver::execute_script` 注入页面的 JavaScript 脚本，
//! 脚本体遵循 WebDriver `executeScript` 约定：以 `arguments[i]` 读取参数，以 `return` 返回结果。

/// 将元素滚动到视口中央
pub const SCROLL_INTO_VIEW: &str =
    "arguments[0].scrollIntoView({behavior: 'auto', block: 'center'});";

/// 直接调用元素的 click()
pub const CLICK: &str = "arguments[0].click();";

/// 派发合成的鼠标点击事件
///
/// `click()` 本身抛错时的兜底方案
pub const DISPATCH_CLICK: &str = r#"
var event = new MouseEvent('click', { bubbles: true, cancelable: true, view: window });
arguments[0].dispatchEvent(event);
"#;

/// 设置 value 并派发 input / change 事件
pub const SET_VALUE: &str = r#"
var el = arguments[0];
el.value = arguments[1];
el.dispatchEvent(new Event('input', { bubbles: true }));
el.dispatchEvent(new Event('change', { bubbles: true }));
"#;

/// 读取元素当前 value
pub const GET_VALUE: &str = "return arguments[0].value;";

/// 基于布局与计算样式判断可见性
pub const IS_VISIBLE: &str = r#"
var elem = arguments[0];
var style = window.getComputedStyle(elem);
return !!(elem.offsetWidth || elem.offsetHeight || elem.getClientRects().length)
    && style.visibility !== 'hidden'
    && style.display !== 'none';
"#;

/// 判断元素是否可用
pub const IS_ENABLED: &str = "return !arguments[0].disabled;";

/// 读取视口尺寸
pub const VIEWPORT_SIZE: &str =
    "return { width: window.innerWidth, height: window.innerHeight };";

/// 滚动到元素并隐藏遮罩层
///
/// `arguments[1]` 为逗号分隔的遮罩选择器
pub const HIDE_OVERLAYS: &str = r#"
arguments[0].scrollIntoView(true);
var overlays = document.querySelectorAll(arguments[1]);
overlays.forEach(function (o) { o.style.display = 'none'; });
return overlays.length;
"#;

/// 导航请求耗时（毫秒），不支持时返回 null
pub const NAVIGATION_RESPONSE_TIME: &str = r#"
if (!window.performance || !window.performance.timing) { return null; }
var t = window.performance.timing;
return t.responseEnd - t.requestStart;
"#;

/// 页面脚本错误计数
pub const PAGE_ERROR_COUNT: &str = "return (window.jsErrors || []).length;";

/// JS 堆已用字节数，不支持时返回 0
pub const JS_HEAP_USED: &str = r#"
return window.performance && window.performance.memory
    ? window.performance.memory.usedJSHeapSize
    : 0;
"#;

/// 安装网络活动观察器
pub const INSTALL_NETWORK_OBSERVER: &str = r#"
if (!window.PerformanceObserver) { return false; }
window.__flakeguardNetwork = window.__flakeguardNetwork || [];
if (!window.__flakeguardObserver) {
    window.__flakeguardObserver = new PerformanceObserver(function (list) {
        list.getEntries().forEach(function (e) {
            window.__flakeguardNetwork.push({
                name: e.name,
                entry_type: e.entryType,
                start_time: e.startTime,
                duration: e.duration
            });
        });
    });
    window.__flakeguardObserver.observe({ entryTypes: ['resource', 'navigation'] });
}
return true;
"#;

/// 读取已观察到的网络条目
pub const READ_NETWORK_ENTRIES: &str = "return window.__flakeguardNetwork || [];";

/// 清空已观察到的网络条目
pub const CLEAR_NETWORK_ENTRIES: &str = "window.__flakeguardNetwork = [];";

/// 页面级性能数据
pub const PAGE_PERFORMANCE: &str = r#"
if (!window.performance) { return null; }
var p = window.performance;
return {
    timing: p.timing ? p.timing.toJSON() : null,
    navigation: p.getEntriesByType ? p.getEntriesByType('navigation').map(function (e) { return e.toJSON(); }) : [],
    resources: p.getEntriesByType ? p.getEntriesByType('resource').map(function (e) { return e.toJSON(); }) : []
};
"#;
