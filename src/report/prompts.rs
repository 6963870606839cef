//! Prompt templates for the three report variants.
//!
//! Templates are written in Korean since the reports are.

use crate::models::{NewsBatch, SearchResult};

/// Date format placed in the weekly prompt
pub const PROMPT_DATE_FORMAT: &str = "%Y년 %m월 %d일";

const WEEKLY_ROLE: &str =
    "너는 로봇 산업 전문 애널리스트야. 제공된 뉴스를 단순히 요약하지 말고, 너의 전문적인 분석과 인사이트를 제공해야 해.";

const WEEKLY_GUIDE: &str = r#"**핵심 지침:**
1. 전체 리포트의 **70%**는 '건설 로봇의 현장 적용'과 '휴머노이드의 기술 진척(제어, AI, 하드웨어)'에 집중
2. 두 분야의 융합 가능성(예: 휴머노이드의 건설 현장 투입)을 적극적으로 분석
3. 나머지 30%는 기타 로봇 시장 동향
4. **중요**: 뉴스를 나열하지 말고, 트렌드를 파악하고 너의 분석을 제시해
5. 이전 분석이 있다면, 트렌드 변화와 연속성을 분석해

**리포트 구조:**

## 1. 🏗️ 건설 로봇 & 휴머노이드 심층 분석 (70%)

### 1.1 건설 로봇 현장 적용 분석
- 현재 기술 수준과 실제 적용 사례 분석
- 주요 기술적 과제와 해결 방향
- 시장 성장 가능성 평가

### 1.2 휴머노이드 로봇 기술 진척
- 제어 기술의 최신 동향 (보행, 균형, 조작)
- AI 통합 현황 (비전, 자율성, 학습)
- 하드웨어 혁신 (액추에이터, 센서, 배터리)

### 1.3 융합 시나리오 분석
- 휴머노이드의 건설 현장 투입 가능성
- 기술적 요구사항과 현재 격차
- 예상 타임라인과 선도 기업

### 1.4 주요 기업 및 프로젝트 평가
- 핵심 플레이어 분석 (테슬라, 보스턴다이내믹스, Figure AI 등)
- 투자 동향과 전략적 방향

## 2. 🤖 기타 로봇 산업 동향 (30%)
- 협동로봇, 물류로봇, AMR 등의 주요 트렌드
- 시장 성장 동력과 제약 요인

## 3. 💡 AI 전망 및 투자 인사이트
- **단기 전망 (6개월~1년)**: 예상되는 주요 이벤트와 기술 발표
- **중기 전망 (1~3년)**: 시장 구조 변화와 기술 성숙도
- **장기 전망 (3~5년)**: 산업 패러다임 전환 가능성
- **투자 관점**: 주목해야 할 기업, 기술, 시장 세그먼트
- **리스크 요인**: 기술적/규제적/시장 리스크

**작성 스타일:**
- 전문적이고 분석적인 톤
- 구체적인 수치와 사례 인용
- 명확한 근거를 바탕으로 한 전망
- 불확실성이 있는 부분은 솔직하게 언급"#;

const FILE_REQUIREMENTS: &str = r#"**분석 요구사항:**
1. 문서의 주요 내용 요약
2. 로봇 산업과의 연관성 분석
3. 기술적 시사점 및 트렌드
4. 비즈니스 및 투자 인사이트
5. 향후 전망 및 권고사항"#;

const FILE_STYLE: &str = r#"**작성 스타일:**
- 전문적이고 분석적인 톤
- 구체적인 내용 인용
- 명확한 구조화
- 실용적인 인사이트 제공"#;

const INTEGRATED_REQUIREMENTS: &str = r#"**통합 리포트 작성 요구사항:**

## 1. 🔄 교차 분석 및 시너지
- 뉴스 트렌드와 파일 내용의 연관성 분석
- 상호 보완적인 인사이트 도출
- 일치하는 부분과 차이점 분석

## 2. 🎯 핵심 인사이트 통합
- 두 분석에서 공통으로 나타나는 핵심 트렌드
- 각 분석에서만 나타나는 독특한 인사이트
- 통합적 관점에서의 시장 전망

## 3. 💡 전략적 제언
- 뉴스와 문서 분석을 종합한 실행 가능한 전략
- 단기/중기/장기 관점의 권고사항
- 주목해야 할 기회와 리스크

## 4. 📊 종합 결론
- 로봇 산업의 현재 상황 종합
- 향후 전망 및 예측
- 최종 투자/비즈니스 인사이트

**작성 스타일:**
- 두 분석을 유기적으로 연결
- 구체적인 근거와 예시 제시
- 실용적이고 실행 가능한 제언
- 명확하고 구조화된 형식"#;

/// `제목/내용/출처` blocks separated by blank lines
pub fn format_news(items: &[SearchResult]) -> String {
    items
        .iter()
        .map(|news| {
            format!(
                "제목: {}\n내용: {}\n출처: {}",
                news.title, news.snippet, news.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Weekly news prompt. `history_digest` is spliced into the instructions when present.
pub fn weekly_news_prompt(batch: &NewsBatch, history_digest: Option<&str>, date: &str) -> String {
    let history_context = history_digest
        .map(|digest| format!("\n\n**이전 분석 참고:**\n{}\n", digest))
        .unwrap_or_default();

    format!(
        "\n{role}\n{history}\n{guide}\n\n\n\
         다음 뉴스 데이터를 바탕으로 주간 로봇 산업 분석 리포트를 작성해주세요.\n\n\
         [그룹 A - 건설 로봇 & 휴머노이드 뉴스 (핵심)]\n{group_a}\n\n\
         [그룹 B - 기타 로봇 뉴스]\n{group_b}\n\n\
         현재 날짜: {date}\n\
         분석 기간: 최근 1주일\n",
        role = WEEKLY_ROLE,
        history = history_context,
        guide = WEEKLY_GUIDE,
        group_a = format_news(&batch.primary),
        group_b = format_news(&batch.secondary),
        date = date,
    )
}

pub fn file_analysis_prompt(document_text: &str) -> String {
    format!(
        "\n다음 문서들을 분석하여 로봇 산업 관점에서 종합 리포트를 작성해주세요.\n\n\
         {requirements}\n\n\
         **문서 내용:**\n{document}\n\n\
         {style}\n",
        requirements = FILE_REQUIREMENTS,
        document = document_text,
        style = FILE_STYLE,
    )
}

pub fn integrated_prompt(news_report: &str, file_report: &str) -> String {
    format!(
        "\n다음 두 가지 분석 결과를 통합하여 종합 리포트를 작성해주세요.\n\n\
         **분석 1: 주간 뉴스 분석 결과**\n{news}\n\n\
         **분석 2: 파일 분석 결과**\n{file}\n\n\
         {requirements}\n",
        news = news_report,
        file = file_report,
        requirements = INTEGRATED_REQUIREMENTS,
    )
}
