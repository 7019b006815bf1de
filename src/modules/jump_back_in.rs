// Jump Back In section - list selection plus the view model feeding the home screen.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::icon_manager::IconProvider;
use crate::modules::layout::LayoutContext;
use crate::modules::tab_groups::{GroupOrdering, TabGroupProvider};
use crate::modules::tabs::TabManager;
use crate::settings::Settings;
use crate::state::{HomeSectionType, ImageKind, Site, SiteImage, Tab, TabGroup};

/// The filtered list shown to the user. Only one group is ever displayed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JumpBackInList {
    pub group: Option<TabGroup>,
    pub tabs: Vec<Tab>,
}

impl JumpBackInList {
    /// Number of tiles, a group counting as one.
    pub fn items_to_display(&self) -> usize {
        self.tabs.len() + usize::from(self.group.is_some())
    }
}

/// Pick up to `max_display_count` items: the group (if any) takes one slot,
/// tabs fill the rest in the given order. Tabs belonging to the group are skipped.
///
/// Stops once the budget is filled, so later tabs are never looked at.
/// A zero budget yields an empty list, group included.
pub fn select(tabs: &[Tab], group: Option<&TabGroup>, max_display_count: usize) -> JumpBackInList {
    // No slot left for the group either
    let group = group.filter(|_| max_display_count > 0);
    let group_count = usize::from(group.is_some());
    let max_tab_count = max_display_count.saturating_sub(group_count);

    let mut recent_tabs = Vec::new();
    if max_tab_count > 0 {
        for tab in tabs {
            // A tab shown inside the group must not show up again on its own
            if group.is_some_and(|g| g.contains(tab)) {
                continue;
            }

            recent_tabs.push(tab.clone());
            if recent_tabs.len() == max_tab_count {
                break;
            }
        }
    }

    JumpBackInList {
        group: group.cloned(),
        tabs: recent_tabs,
    }
}

/// Build the list from recent tabs and the first of the available groups.
pub fn create_jump_back_in_list(tabs: &[Tab], groups: Option<&[TabGroup]>, max_display_count: usize) -> JumpBackInList {
    let recent_group = groups.and_then(|g| g.first());
    select(tabs, recent_group, max_display_count)
}

/// Text field state of the toolbar. Tapping a tile has to leave overlay mode first.
pub trait UrlBar: Send + Sync {
    fn in_overlay_mode(&self) -> bool;
    fn leave_overlay_mode(&self);
}

#[derive(Debug, Default)]
struct RecentActivity {
    tabs: Vec<Tab>,
    groups: Option<Vec<TabGroup>>,
}

type TapGroupCallback = Box<dyn Fn(&Tab) + Send + Sync>;

pub struct JumpBackInViewModel {
    tab_manager: Arc<dyn TabManager>,
    group_provider: Arc<dyn TabGroupProvider>,
    url_bar: Arc<dyn UrlBar>,
    icon_provider: Arc<dyn IconProvider>,
    settings: ArcSwap<Settings>,
    recent: ArcSwap<RecentActivity>,
    jump_back_in_list: ArcSwap<JumpBackInList>,
    is_private: AtomicBool,
    is_zero_search: bool,
    on_tap_group: Option<TapGroupCallback>,
}

impl JumpBackInViewModel {
    pub fn new(
        settings: Settings,
        tab_manager: Arc<dyn TabManager>,
        group_provider: Arc<dyn TabGroupProvider>,
        url_bar: Arc<dyn UrlBar>,
        icon_provider: Arc<dyn IconProvider>,
        is_private: bool,
    ) -> Self {
        Self {
            tab_manager,
            group_provider,
            url_bar,
            icon_provider,
            settings: ArcSwap::from_pointee(settings),
            recent: ArcSwap::from_pointee(RecentActivity::default()),
            jump_back_in_list: ArcSwap::from_pointee(JumpBackInList::default()),
            is_private: AtomicBool::new(is_private),
            is_zero_search: false,
            on_tap_group: None,
        }
    }

    /// Mark the home screen as shown from the URL bar (zero search state).
    pub fn zero_search(mut self, is_zero_search: bool) -> Self {
        self.is_zero_search = is_zero_search;
        self
    }

    pub fn is_zero_search(&self) -> bool {
        self.is_zero_search
    }

    pub fn set_on_tap_group<F>(&mut self, callback: F)
    where
        F: Fn(&Tab) + Send + Sync + 'static,
    {
        self.on_tap_group = Some(Box::new(callback));
    }

    pub fn section_type(&self) -> HomeSectionType {
        HomeSectionType::JumpBackIn
    }

    pub fn should_reload_section(&self) -> bool {
        true
    }

    pub fn jump_back_in_list(&self) -> Arc<JumpBackInList> {
        self.jump_back_in_list.load_full()
    }

    pub fn max_items_to_display(&self) -> usize {
        let settings = self.settings.load();
        settings.layout.max_items_to_display(settings.layout_context)
    }

    pub fn max_items_in_column(&self) -> usize {
        let settings = self.settings.load();
        settings.layout.max_items_in_column(settings.layout_context)
    }

    pub fn number_of_items_in_column(&self) -> usize {
        let settings = self.settings.load();
        settings
            .layout
            .items_in_column(settings.layout_context, self.jump_back_in_list.load().items_to_display())
    }

    pub fn is_enabled(&self) -> bool {
        let settings = self.settings.load();
        let features = &settings.features;
        if !(features.jump_back_in && features.jump_back_in_section_enabled && features.jump_back_in_user_enabled) {
            return false;
        }
        !self.is_private.load(Ordering::SeqCst)
    }

    pub fn has_data(&self) -> bool {
        self.jump_back_in_list.load().items_to_display() != 0
    }

    pub fn update_privacy_concerned_section(&self, is_private: bool) {
        self.is_private.store(is_private, Ordering::SeqCst);
    }

    /// Apply a new device orientation / class and rebuild the list for it.
    pub fn set_layout(&self, layout_context: LayoutContext) {
        self.settings.rcu(|current| {
            let mut next = Settings::clone(current);
            next.layout_context = layout_context;
            next
        });
        self.refresh_data();
    }

    /// Recompute the list from the last fetched tabs and groups.
    pub fn refresh_data(&self) {
        let recent = self.recent.load();
        let list = create_jump_back_in_list(&recent.tabs, recent.groups.as_deref(), self.max_items_to_display());
        self.jump_back_in_list.store(Arc::new(list));
    }

    /// Pull recent tabs (and groups, when enabled) from the collaborators and rebuild the list.
    pub async fn update_data(&self) {
        let tabs = self.tab_manager.recently_accessed_normal_tabs();

        let groups = if self.settings.load().features.tab_tray_groups {
            Some(self.group_provider.tab_groups(tabs.clone(), GroupOrdering::Descending).await)
        } else {
            None
        };

        log::debug!(
            "[JumpBackIn] Updating with {} tabs, {} groups",
            tabs.len(),
            groups.as_ref().map_or(0, |g| g.len())
        );
        self.recent.store(Arc::new(RecentActivity { tabs, groups }));
        self.refresh_data();
    }

    fn leave_overlay_mode(&self) {
        if self.url_bar.in_overlay_mode() {
            self.url_bar.leave_overlay_mode();
        }
    }

    pub fn switch_to_group(&self, group: &TabGroup) {
        self.leave_overlay_mode();
        let Some(first_tab) = group.grouped_items.first() else { return };

        if let Some(on_tap_group) = &self.on_tap_group {
            on_tap_group(first_tab);
        }
        log::info!("[JumpBackIn] Opened group '{}' (zero search: {})", group.search_term, self.is_zero_search);
    }

    pub fn switch_to_tab(&self, tab: &Tab) {
        self.leave_overlay_mode();
        self.tab_manager.select_tab(tab);
        log::info!("[JumpBackIn] Opened tab {} (zero search: {})", tab.id, self.is_zero_search);
    }

    pub async fn get_favicon_image(&self, site: &Site) -> Option<SiteImage> {
        self.icon_provider.fetch_icon(site, ImageKind::Favicon, false).await
    }

    pub async fn get_hero_image(&self, site: &Site) -> Option<SiteImage> {
        self.icon_provider.fetch_icon(site, ImageKind::HeroImage, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::layout::{DeviceClass, Orientation};
    use crate::modules::tab_groups::SearchTermGroups;
    use crate::modules::tabs::TabStore;
    use crate::testing::{base_time, create_test_tab, remote_image, StaticIconProvider};
    use rstest::rstest;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    fn group_of(term: &str, tabs: &[&Tab]) -> TabGroup {
        TabGroup {
            search_term: term.to_string(),
            grouped_items: tabs.iter().map(|t| (*t).clone()).collect(),
            timestamp: base_time(),
        }
    }

    fn ids(list: &JumpBackInList) -> Vec<&str> {
        list.tabs.iter().map(|t| t.id.as_str()).collect()
    }

    // --- select tests ---

    #[test]
    fn test_group_takes_a_slot_and_members_are_skipped() {
        let (a, b, c, d) = (
            create_test_tab("A", 1),
            create_test_tab("B", 2),
            create_test_tab("C", 3),
            create_test_tab("D", 4),
        );
        let group = group_of("b", &[&b]);

        let list = select(&[a, b, c, d], Some(&group), 2);

        assert_eq!(list.group, Some(group));
        assert_eq!(ids(&list), vec!["A"]);
        assert_eq!(list.items_to_display(), 2);
    }

    #[test]
    fn test_without_group_fills_budget_in_order() {
        let tabs = [create_test_tab("A", 1), create_test_tab("B", 2), create_test_tab("C", 3)];
        let list = select(&tabs, None, 2);

        assert_eq!(list.group, None);
        assert_eq!(ids(&list), vec!["A", "B"]);
    }

    #[test]
    fn test_empty_input() {
        let list = select(&[], None, 4);
        assert_eq!(list, JumpBackInList::default());
        assert_eq!(list.items_to_display(), 0);
    }

    #[rstest]
    #[case(0, true, 0)]
    #[case(0, false, 0)]
    #[case(1, true, 1)]
    #[case(1, false, 1)]
    fn test_tiny_budgets(#[case] max: usize, #[case] with_group: bool, #[case] expected_items: usize) {
        let tabs = [create_test_tab("A", 1), create_test_tab("B", 2)];
        let group = group_of("x", &[&create_test_tab("X", 0)]);
        let list = select(&tabs, with_group.then_some(&group), max);

        assert!(list.tabs.is_empty() || !with_group);
        assert_eq!(list.items_to_display(), expected_items);
    }

    #[test]
    fn test_order_decides_which_tabs_make_the_cut() {
        let tabs = [create_test_tab("C", 3), create_test_tab("A", 1), create_test_tab("B", 2)];
        let list = select(&tabs, None, 2);
        assert_eq!(ids(&list), vec!["C", "A"]);
    }

    #[test]
    fn test_invariants_hold_for_all_small_inputs() {
        let pool: Vec<Tab> = (0..6).map(|i| create_test_tab(&format!("t{}", i), i)).collect();

        for len in 0..=pool.len() {
            let tabs = &pool[..len];
            // Every subset of the first four tabs as group membership
            for mask in 0u8..16 {
                let members: Vec<&Tab> = pool.iter().take(4).enumerate().filter(|(i, _)| mask & (1u8 << *i) != 0).map(|(_, t)| t).collect();
                let group = group_of("g", &members);

                for max in 0..6 {
                    for group in [None, Some(&group)] {
                        let list = select(tabs, group, max);
                        if let Some(g) = group {
                            assert!(list.tabs.iter().all(|t| !g.contains(t)));
                        }
                        assert!(list.items_to_display() <= max);
                    }
                }
            }
        }
    }

    #[test]
    fn test_create_list_uses_first_group() {
        let (a, b, c) = (create_test_tab("A", 1), create_test_tab("B", 2), create_test_tab("C", 3));
        let first = group_of("first", &[&a]);
        let second = group_of("second", &[&b]);
        let groups = vec![first.clone(), second];

        let list = create_jump_back_in_list(&[a, b, c], Some(&groups), 3);
        assert_eq!(list.group, Some(first));
        assert_eq!(ids(&list), vec!["B", "C"]);

        let no_groups = create_jump_back_in_list(&[create_test_tab("A", 1)], Some(&[]), 3);
        assert_eq!(no_groups.group, None);
    }

    // --- view model tests ---

    #[derive(Default)]
    struct FakeUrlBar {
        overlay: AtomicBool,
        leave_calls: AtomicUsize,
    }

    impl UrlBar for FakeUrlBar {
        fn in_overlay_mode(&self) -> bool {
            self.overlay.load(Ordering::SeqCst)
        }

        fn leave_overlay_mode(&self) {
            self.overlay.store(false, Ordering::SeqCst);
            self.leave_calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Fixture {
        tabs: Arc<TabStore>,
        url_bar: Arc<FakeUrlBar>,
        icons: Arc<StaticIconProvider>,
    }

    impl Fixture {
        fn new(tabs: Vec<Tab>) -> Self {
            Self {
                tabs: Arc::new(TabStore::new(tabs)),
                url_bar: Arc::new(FakeUrlBar::default()),
                icons: StaticIconProvider::new(Some(remote_image(ImageKind::Favicon))),
            }
        }

        fn view_model(&self, settings: Settings) -> JumpBackInViewModel {
            JumpBackInViewModel::new(
                settings,
                self.tabs.clone(),
                Arc::new(SearchTermGroups),
                self.url_bar.clone(),
                self.icons.clone(),
                false,
            )
        }
    }

    fn recent_tabs() -> Vec<Tab> {
        vec![
            create_test_tab("news", 1),
            create_test_tab("rust-1", 2).with_search_term("rust"),
            create_test_tab("mail", 3),
            create_test_tab("rust-2", 4).with_search_term("rust"),
            create_test_tab("docs", 5),
        ]
    }

    fn landscape_phone() -> Settings {
        let mut settings = Settings::default();
        settings.layout_context = LayoutContext::new(DeviceClass::Phone, Orientation::Landscape);
        settings
    }

    #[tokio::test]
    async fn test_update_data_with_groups() {
        let fixture = Fixture::new(recent_tabs());
        let vm = fixture.view_model(landscape_phone());
        assert!(!vm.has_data());

        vm.update_data().await;
        let list = vm.jump_back_in_list();

        assert_eq!(list.group.as_ref().map(|g| g.search_term.as_str()), Some("rust"));
        assert_eq!(ids(&list), vec!["news", "mail", "docs"]);
        assert_eq!(list.items_to_display(), 4);
        assert!(vm.has_data());
    }

    #[tokio::test]
    async fn test_update_data_without_groups_feature() {
        let fixture = Fixture::new(recent_tabs());
        let mut settings = landscape_phone();
        settings.features.tab_tray_groups = false;
        let vm = fixture.view_model(settings);

        vm.update_data().await;
        let list = vm.jump_back_in_list();

        assert_eq!(list.group, None);
        assert_eq!(ids(&list), vec!["news", "rust-1", "mail", "rust-2"]);
    }

    #[tokio::test]
    async fn test_refresh_after_rotation() {
        let fixture = Fixture::new(recent_tabs());
        let vm = fixture.view_model(landscape_phone());
        vm.update_data().await;
        assert_eq!(vm.jump_back_in_list().items_to_display(), 4);

        vm.set_layout(LayoutContext::new(DeviceClass::Phone, Orientation::Portrait));
        let list = vm.jump_back_in_list();
        assert!(list.group.is_some());
        assert_eq!(ids(&list), vec!["news"]);
        assert_eq!(vm.max_items_to_display(), 2);

        vm.set_layout(LayoutContext::new(DeviceClass::Pad, Orientation::Portrait));
        assert_eq!(vm.jump_back_in_list().items_to_display(), 3);
        assert_eq!(vm.max_items_in_column(), 1);
    }

    #[tokio::test]
    async fn test_number_of_items_in_column() {
        let fixture = Fixture::new(vec![create_test_tab("only", 1)]);
        let vm = fixture.view_model(Settings::default());

        vm.update_data().await;
        assert_eq!(vm.number_of_items_in_column(), 1);

        fixture.tabs.add_tab(create_test_tab("second", 2));
        vm.update_data().await;
        assert_eq!(vm.number_of_items_in_column(), 2);

        vm.set_layout(LayoutContext::new(DeviceClass::Pad, Orientation::Landscape));
        assert_eq!(vm.number_of_items_in_column(), 1);
    }

    #[rstest]
    #[case(true, true, true, false, true)]
    #[case(false, true, true, false, false)]
    #[case(true, false, true, false, false)]
    #[case(true, true, false, false, false)]
    #[case(true, true, true, true, false)]
    fn test_is_enabled(
        #[case] build: bool,
        #[case] section: bool,
        #[case] user: bool,
        #[case] private: bool,
        #[case] expected: bool,
    ) {
        let mut settings = Settings::default();
        settings.features.jump_back_in = build;
        settings.features.jump_back_in_section_enabled = section;
        settings.features.jump_back_in_user_enabled = user;

        let vm = Fixture::new(Vec::new()).view_model(settings);
        vm.update_privacy_concerned_section(private);
        assert_eq!(vm.is_enabled(), expected);
    }

    #[test]
    fn test_leaving_private_mode_enables_section() {
        let fixture = Fixture::new(Vec::new());
        let vm = JumpBackInViewModel::new(
            Settings::default(),
            fixture.tabs.clone(),
            Arc::new(SearchTermGroups),
            fixture.url_bar.clone(),
            fixture.icons.clone(),
            true,
        );
        assert!(!vm.is_enabled());
        vm.update_privacy_concerned_section(false);
        assert!(vm.is_enabled());
        assert_eq!(vm.section_type(), HomeSectionType::JumpBackIn);
        assert!(vm.should_reload_section());
    }

    #[test]
    fn test_switch_to_tab_selects_and_leaves_overlay() {
        let fixture = Fixture::new(recent_tabs());
        let vm = fixture.view_model(Settings::default()).zero_search(true);
        fixture.url_bar.overlay.store(true, Ordering::SeqCst);

        vm.switch_to_tab(&create_test_tab("docs", 5));

        assert!(vm.is_zero_search());
        assert_eq!(fixture.tabs.active_tab_id().as_deref(), Some("docs"));
        assert_eq!(fixture.url_bar.leave_calls.load(Ordering::SeqCst), 1);

        // Not in overlay mode: nothing to leave
        vm.switch_to_tab(&create_test_tab("news", 1));
        assert_eq!(fixture.url_bar.leave_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_switch_to_group_opens_first_tab() {
        let fixture = Fixture::new(Vec::new());
        let mut vm = fixture.view_model(Settings::default());
        let tapped = Arc::new(Mutex::new(Vec::new()));
        let tapped_cb = tapped.clone();
        vm.set_on_tap_group(move |tab| tapped_cb.lock().unwrap().push(tab.id.clone()));

        let (a, b) = (create_test_tab("a", 1), create_test_tab("b", 2));
        vm.switch_to_group(&group_of("rust", &[&a, &b]));
        vm.switch_to_group(&group_of("empty", &[]));

        assert_eq!(*tapped.lock().unwrap(), vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn test_image_requests_disable_fallback() {
        let fixture = Fixture::new(Vec::new());
        let vm = fixture.view_model(Settings::default());
        let site = Site::new("https://example.com", "Example");

        let favicon = vm.get_favicon_image(&site).await.unwrap();
        let hero = vm.get_hero_image(&site).await.unwrap();

        assert_eq!(favicon.kind, ImageKind::Favicon);
        assert_eq!(hero.kind, ImageKind::HeroImage);
        assert_eq!(
            fixture.icons.requests(),
            vec![
                ("https://example.com".to_string(), ImageKind::Favicon, false),
                ("https://example.com".to_string(), ImageKind::HeroImage, false),
            ]
        );
    }
}
